// HTTP routes: JSON API, HTML pages, health and metrics.

pub mod pages;

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, AdminUser, SessionKeys};
use crate::metrics;
use crate::session::AdminGate;
use crate::store::{ContestantStore, ScoreUpdate};

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddContestantRequest {
    pub name: String,
    #[serde(default)]
    pub faction: String,
}

#[derive(Deserialize)]
pub struct AddScoreRequest {
    pub amount: ScoreAmount,
}

/// Score delta as submitted: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScoreAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScoreAmount {
    /// Integer delta, or `None` for non-numeric or fractional input.
    pub fn to_delta(&self) -> Option<i64> {
        match self {
            ScoreAmount::Int(v) => Some(*v),
            ScoreAmount::Float(v) => float_delta(*v),
            ScoreAmount::Text(s) => parse_score_delta(s),
        }
    }
}

/// Parse a score delta typed into a form. Surrounding whitespace is ignored
/// and an empty field counts as zero.
pub fn parse_score_delta(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(float_delta))
}

fn float_delta(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContestantStore>,
    pub gate: Arc<AdminGate>,
    pub keys: Arc<SessionKeys>,
}

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": msg })))
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        // HTML view
        .route("/", get(pages::index))
        .route("/login", post(pages::login))
        .route("/contestants", post(pages::add_contestant))
        .route("/contestants/{id}/score", post(pages::add_score))
        .route("/contestants/{id}/knockout", post(pages::knock_out))
        // JSON API
        .route("/api/login", post(auth::login))
        .route(
            "/api/contestants",
            get(list_contestants).post(add_contestant),
        )
        .route("/api/contestants/{id}/score", post(add_score))
        .route("/api/contestants/{id}/knockout", post(knock_out))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "leaderboard-backend",
        "backend": state.store.backend(),
        "in_sync": state.store.is_in_sync(),
    }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

// ── Contestant handlers ──────────────────────────────────────────────

async fn list_contestants(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!(state.store.display_order().await))
}

async fn add_contestant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<AddContestantRequest>,
) -> impl IntoResponse {
    match state.store.add(&req.name, &req.faction).await {
        Some(contestant) => {
            tracing::info!("Added contestant {} ({})", contestant.name, contestant.id);
            (StatusCode::CREATED, Json(json!(contestant))).into_response()
        }
        None => json_error(StatusCode::BAD_REQUEST, "name is required").into_response(),
    }
}

async fn add_score(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<AddScoreRequest>,
) -> impl IntoResponse {
    let Some(delta) = req.amount.to_delta() else {
        return json_error(StatusCode::BAD_REQUEST, "amount must be a whole number")
            .into_response();
    };
    match state.store.add_score_if_active(id, delta).await {
        ScoreUpdate::Updated(contestant) => (StatusCode::OK, Json(json!(contestant))).into_response(),
        ScoreUpdate::KnockedOut(_) => {
            json_error(StatusCode::CONFLICT, "Contestant has been knocked out").into_response()
        }
        ScoreUpdate::Missing => {
            json_error(StatusCode::NOT_FOUND, "Contestant not found").into_response()
        }
    }
}

async fn knock_out(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.knock_out(id).await {
        Some(contestant) => {
            tracing::info!("Knocked out contestant {} ({})", contestant.name, contestant.id);
            (StatusCode::OK, Json(json!(contestant))).into_response()
        }
        None => json_error(StatusCode::NOT_FOUND, "Contestant not found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_delta() {
        assert_eq!(parse_score_delta("5"), Some(5));
        assert_eq!(parse_score_delta(" -2 "), Some(-2));
        assert_eq!(parse_score_delta(""), Some(0));
        assert_eq!(parse_score_delta("   "), Some(0));
        assert_eq!(parse_score_delta("+7"), Some(7));
        assert_eq!(parse_score_delta("3.0"), Some(3));
        assert_eq!(parse_score_delta("1e2"), Some(100));
        assert_eq!(parse_score_delta("1.5"), None);
        assert_eq!(parse_score_delta("ten"), None);
        assert_eq!(parse_score_delta("NaN"), None);
        assert_eq!(parse_score_delta("inf"), None);
    }

    #[test]
    fn test_score_amount_json_forms() {
        let parse = |v: serde_json::Value| {
            serde_json::from_value::<AddScoreRequest>(json!({ "amount": v }))
                .unwrap()
                .amount
                .to_delta()
        };
        assert_eq!(parse(json!(4)), Some(4));
        assert_eq!(parse(json!(-4)), Some(-4));
        assert_eq!(parse(json!(2.0)), Some(2));
        assert_eq!(parse(json!(2.5)), None);
        assert_eq!(parse(json!("12")), Some(12));
        assert_eq!(parse(json!("")), Some(0));
        assert_eq!(parse(json!("abc")), None);
    }
}
