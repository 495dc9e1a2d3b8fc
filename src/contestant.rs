// Contestant records and the score-ordered view of a collection.

use serde::{Deserialize, Deserializer, Serialize};

/// Label shown in place of an empty faction.
pub const NO_FACTION: &str = "No Faction";

/// A participant on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub faction: String,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Contestant {
    /// A freshly added contestant: zero score, still in the game.
    pub fn new(id: i64, name: impl Into<String>, faction: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            faction: faction.into(),
            score: 0,
            active: true,
        }
    }

    /// Faction as displayed, falling back to [`NO_FACTION`].
    pub fn faction_label(&self) -> &str {
        if self.faction.is_empty() {
            NO_FACTION
        } else {
            &self.faction
        }
    }
}

fn default_active() -> bool {
    true
}

/// Older documents may hold `null` (a NaN that went through JSON) or a
/// fractional number in `score`.
fn deserialize_score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<RawScore>::deserialize(deserializer)? {
        Some(RawScore::Int(v)) => v,
        Some(RawScore::Float(v)) if v.is_finite() => v.trunc() as i64,
        Some(RawScore::Float(_)) | None => 0,
    })
}

/// Contestants sorted by score, highest first. Equal scores keep their
/// relative order from `contestants`.
pub fn display_order(contestants: &[Contestant]) -> Vec<Contestant> {
    let mut ordered = contestants.to_vec();
    // sort_by is stable
    ordered.sort_by(|a, b| b.score.cmp(&a.score));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contestant(id: i64, name: &str, score: i64) -> Contestant {
        Contestant {
            score,
            ..Contestant::new(id, name, "")
        }
    }

    #[test]
    fn test_new_contestant_defaults() {
        let c = Contestant::new(7, "Alice", "Red");
        assert_eq!(c.id, 7);
        assert_eq!(c.score, 0);
        assert!(c.active);
        assert_eq!(c.faction_label(), "Red");
    }

    #[test]
    fn test_empty_faction_label() {
        let c = Contestant::new(1, "Bob", "");
        assert_eq!(c.faction_label(), "No Faction");
    }

    #[test]
    fn test_display_order_descending() {
        let list = vec![
            contestant(1, "a", 3),
            contestant(2, "b", 10),
            contestant(3, "c", -4),
            contestant(4, "d", 7),
        ];
        let ordered = display_order(&list);
        let scores: Vec<i64> = ordered.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![10, 7, 3, -4]);
    }

    #[test]
    fn test_display_order_is_stable() {
        let list = vec![
            contestant(1, "first", 5),
            contestant(2, "high", 9),
            contestant(3, "second", 5),
            contestant(4, "third", 5),
        ];
        let ordered = display_order(&list);
        let names: Vec<&str> = ordered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["high", "first", "second", "third"]);
    }

    #[test]
    fn test_display_order_leaves_input_untouched() {
        let list = vec![contestant(1, "low", 1), contestant(2, "high", 2)];
        let _ = display_order(&list);
        assert_eq!(list[0].name, "low");
    }

    #[test]
    fn test_wire_format_field_names() {
        let c = Contestant::new(1700000000000, "Eve", "Green");
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1700000000000_i64,
                "name": "Eve",
                "faction": "Green",
                "score": 0,
                "active": true
            })
        );
    }

    #[test]
    fn test_lenient_score_and_defaults() {
        let parsed: Vec<Contestant> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "nan", "faction": "", "score": null, "active": true},
                {"id": 2, "name": "frac", "score": 2.75, "active": false},
                {"id": 3, "name": "bare"}
            ]"#,
        )
        .unwrap();
        assert_eq!(parsed[0].score, 0);
        assert_eq!(parsed[1].score, 2);
        assert_eq!(parsed[1].faction, "");
        assert!(!parsed[1].active);
        assert_eq!(parsed[2].score, 0);
        assert!(parsed[2].active);
    }
}
