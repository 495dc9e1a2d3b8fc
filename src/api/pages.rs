// HTML page and form handlers. Every successful gesture redirects back to
// `/` so the browser re-renders from the updated store.

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use super::{parse_score_delta, AppState};
use crate::auth::{attempt_login, CurrentSession, LoginOutcome, SESSION_COOKIE};
use crate::session::AdminSession;
use crate::store::ScoreUpdate;
use crate::view::{render_page, Page};

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct AddContestantForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub faction: String,
}

#[derive(Deserialize)]
pub struct ScoreForm {
    #[serde(default)]
    pub amount: String,
}

async fn page_response(
    state: &AppState,
    session: &AdminSession,
    status: StatusCode,
    notice: Option<&str>,
) -> Response {
    let contestants = state.store.display_order().await;
    let html = render_page(&Page {
        contestants: &contestants,
        session,
        notice,
        unsaved: !state.store.is_in_sync(),
    });
    (status, Html(html)).into_response()
}

async fn login_required(state: &AppState, session: &AdminSession) -> Response {
    page_response(
        state,
        session,
        StatusCode::UNAUTHORIZED,
        Some("Admin login required"),
    )
    .await
}

pub async fn index(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Response {
    page_response(&state, &session, StatusCode::OK, None).await
}

pub async fn login(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match attempt_login(&state, &form.password) {
        Ok(LoginOutcome::Accepted(token)) => {
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Redirect::to("/")).into_response()
        }
        Ok(LoginOutcome::Rejected(e)) => {
            page_response(
                &state,
                &session,
                StatusCode::UNAUTHORIZED,
                Some(e.to_string().as_str()),
            )
            .await
        }
        Err(e) => {
            tracing::error!("Token creation error: {e}");
            page_response(
                &state,
                &session,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some("Internal error"),
            )
            .await
        }
    }
}

pub async fn add_contestant(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Form(form): Form<AddContestantForm>,
) -> Response {
    if !session.is_authenticated() {
        return login_required(&state, &session).await;
    }
    // A blank name is silently ignored, matching the store contract.
    if let Some(c) = state.store.add(&form.name, &form.faction).await {
        tracing::info!("Added contestant {} ({})", c.name, c.id);
    }
    Redirect::to("/").into_response()
}

pub async fn add_score(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
    Form(form): Form<ScoreForm>,
) -> Response {
    if !session.is_authenticated() {
        return login_required(&state, &session).await;
    }
    let Some(delta) = parse_score_delta(&form.amount) else {
        return page_response(
            &state,
            &session,
            StatusCode::BAD_REQUEST,
            Some("Score must be a whole number"),
        )
        .await;
    };
    if let ScoreUpdate::KnockedOut(_) = state.store.add_score_if_active(id, delta).await {
        return page_response(
            &state,
            &session,
            StatusCode::CONFLICT,
            Some("Contestant has been knocked out"),
        )
        .await;
    }
    Redirect::to("/").into_response()
}

pub async fn knock_out(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<i64>,
) -> Response {
    if !session.is_authenticated() {
        return login_required(&state, &session).await;
    }
    if let Some(c) = state.store.knock_out(id).await {
        tracing::info!("Knocked out contestant {} ({})", c.name, c.id);
    }
    Redirect::to("/").into_response()
}
