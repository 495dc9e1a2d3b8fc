// Server-rendered leaderboard page.
//
// Rendering is a pure function of the ranked contestants, the viewer's
// session and an optional notice; every gesture on the page is a plain form
// post handled in `api::pages`.

use std::fmt::Write;

use crate::contestant::Contestant;
use crate::session::AdminSession;

/// Everything the page shows.
pub struct Page<'a> {
    /// Contestants already in display order.
    pub contestants: &'a [Contestant],
    pub session: &'a AdminSession,
    pub notice: Option<&'a str>,
    /// Set when the last save did not reach the back end.
    pub unsaved: bool,
}

const STYLE: &str = "\
body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
h1{text-align:center}\
section{border:1px solid #ddd;border-radius:6px;padding:1rem;margin-bottom:1.5rem}\
form.inline{display:inline}\
.notice{background:#fdecea;color:#b71c1c;padding:.5rem 1rem;border-radius:4px}\
.warning{background:#fff8e1;color:#8d6e00;padding:.5rem 1rem;border-radius:4px}\
.row{display:flex;justify-content:space-between;align-items:center;padding:.5rem;margin-bottom:.5rem;border-radius:4px}\
.row.out{background:#e0e0e0;text-decoration:line-through}\
input.score{width:6rem}";

pub fn render_page(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Leaderboard</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>&#127942; Leaderboard</h1>\n");

    if let Some(notice) = page.notice {
        let _ = writeln!(html, "<p class=\"notice\" role=\"alert\">{}</p>", escape(notice));
    }
    if page.unsaved {
        html.push_str(
            "<p class=\"warning\">Latest changes could not be saved; they are kept here until the next successful save.</p>\n",
        );
    }

    if page.session.is_authenticated() {
        html.push_str(concat!(
            "<section id=\"admin\">\n<h2>Admin Area</h2>\n",
            "<form method=\"post\" action=\"/contestants\">\n",
            "<input name=\"name\" placeholder=\"Contestant Name\" required>\n",
            "<input name=\"faction\" placeholder=\"Faction\">\n",
            "<button type=\"submit\">Add</button>\n",
            "</form>\n</section>\n",
        ));
    } else {
        html.push_str(concat!(
            "<section id=\"login\">\n<h2>Admin Login</h2>\n",
            "<form method=\"post\" action=\"/login\">\n",
            "<input type=\"password\" name=\"password\" placeholder=\"Enter admin password\">\n",
            "<button type=\"submit\">Login</button>\n",
            "</form>\n</section>\n",
        ));
    }

    html.push_str("<section id=\"leaderboard\">\n<h2>Leaderboard</h2>\n");
    for c in page.contestants {
        render_row(&mut html, c, page.session);
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}

fn render_row(html: &mut String, c: &Contestant, session: &AdminSession) {
    let class = if c.active { "row" } else { "row out" };
    let _ = write!(
        html,
        "<div class=\"{class}\" id=\"contestant-{id}\">\n<span>{name} ({faction}) - {score} pts</span>\n",
        id = c.id,
        name = escape(&c.name),
        faction = escape(c.faction_label()),
        score = c.score,
    );

    if c.active && session.is_authenticated() {
        let _ = write!(
            html,
            concat!(
                "<span>\n",
                "<form class=\"inline\" method=\"post\" action=\"/contestants/{id}/score\">",
                "<input class=\"score\" type=\"number\" name=\"amount\" placeholder=\"Score\">",
                "<button type=\"submit\">Add Score</button></form>\n",
                "<form class=\"inline\" method=\"post\" action=\"/contestants/{id}/knockout\">",
                "<button type=\"submit\">Knock Out</button></form>\n",
                "</span>\n",
            ),
            id = c.id,
        );
    }
    html.push_str("</div>\n");
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AdminGate;

    fn admin() -> AdminSession {
        let mut session = AdminSession::new();
        session
            .login("pw", &AdminGate::new(Some("pw".into())))
            .unwrap();
        session
    }

    fn render(contestants: &[Contestant], session: &AdminSession) -> String {
        render_page(&Page {
            contestants,
            session,
            notice: None,
            unsaved: false,
        })
    }

    #[test]
    fn test_anonymous_sees_login_only() {
        let html = render(&[Contestant::new(1, "Alice", "Red")], &AdminSession::new());
        assert!(html.contains("action=\"/login\""));
        assert!(!html.contains("id=\"admin\""));
        assert!(!html.contains("Knock Out"));
        assert!(html.contains("Alice (Red) - 0 pts"));
    }

    #[test]
    fn test_admin_sees_controls_for_active_only() {
        let mut out = Contestant::new(2, "Bob", "");
        out.active = false;
        let html = render(&[Contestant::new(1, "Alice", "Red"), out], &admin());

        assert!(html.contains("id=\"admin\""));
        assert!(!html.contains("action=\"/login\""));
        assert!(html.contains("/contestants/1/score"));
        assert!(html.contains("/contestants/1/knockout"));
        assert!(!html.contains("/contestants/2/score"));
        assert!(!html.contains("/contestants/2/knockout"));
    }

    #[test]
    fn test_knocked_out_row_styling_and_no_faction() {
        let mut out = Contestant::new(2, "Bob", "");
        out.active = false;
        let html = render(&[out], &AdminSession::new());
        assert!(html.contains("class=\"row out\" id=\"contestant-2\""));
        assert!(html.contains("Bob (No Faction) - 0 pts"));
    }

    #[test]
    fn test_rows_follow_given_order() {
        let mut high = Contestant::new(2, "High", "");
        high.score = 9;
        let html = render(&[high, Contestant::new(1, "Low", "")], &AdminSession::new());
        let high_at = html.find("High").unwrap();
        let low_at = html.find("Low").unwrap();
        assert!(high_at < low_at);
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render(
            &[Contestant::new(1, "<script>alert(1)</script>", "\"Q\" & A")],
            &AdminSession::new(),
        );
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&quot;Q&quot; &amp; A"));
    }

    #[test]
    fn test_notice_and_unsaved_banner() {
        let session = AdminSession::new();
        let html = render_page(&Page {
            contestants: &[],
            session: &session,
            notice: Some("Incorrect password"),
            unsaved: true,
        });
        assert!(html.contains("role=\"alert\">Incorrect password</p>"));
        assert!(html.contains("could not be saved"));
    }
}
