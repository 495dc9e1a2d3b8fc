// Admin authentication: password check, signed session tokens, and extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::error::{SessionError, TokenError};
use crate::metrics;
use crate::session::AdminSession;

/// Cookie carrying the session token for the HTML view.
pub const SESSION_COOKIE: &str = "leaderboard_session";

const ADMIN_ROLE: &str = "admin";

// ── Session tokens ───────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub role: String,
    pub iat: usize,
    pub exp: usize, // expiry (unix timestamp)
}

/// Signing and verification keys plus the token lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Token proving a successful admin login.
    pub fn issue(&self) -> Result<String, TokenError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())?.claims;
        if claims.role != ADMIN_ROLE {
            return Err(TokenError::NotAdmin);
        }
        Ok(claims)
    }
}

// ── Login ────────────────────────────────────────────────────────────

pub enum LoginOutcome {
    /// Password matched; carries a fresh session token.
    Accepted(String),
    Rejected(SessionError),
}

/// Check a submitted password against the configured secret.
pub fn attempt_login(state: &AppState, password: &str) -> Result<LoginOutcome, TokenError> {
    let mut session = AdminSession::new();
    match session.login(password, &state.gate) {
        Ok(()) => {
            metrics::LOGIN_ATTEMPTS_TOTAL
                .with_label_values(&["accepted"])
                .inc();
            tracing::info!("Admin login accepted");
            Ok(LoginOutcome::Accepted(state.keys.issue()?))
        }
        Err(e) => {
            metrics::LOGIN_ATTEMPTS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            if state.gate.is_configured() {
                tracing::warn!("Admin login rejected");
            } else {
                tracing::warn!("Admin login rejected: no ADMIN_PASSWORD configured");
            }
            Ok(LoginOutcome::Rejected(e))
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in_seconds: i64,
}

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> impl IntoResponse {
    match attempt_login(&state, &req.password) {
        Ok(LoginOutcome::Accepted(token)) => (
            StatusCode::OK,
            Json(serde_json::json!(LoginResponse {
                token,
                expires_in_seconds: state.keys.ttl().num_seconds(),
            })),
        )
            .into_response(),
        Ok(LoginOutcome::Rejected(e)) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Token creation error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal error" })),
            )
                .into_response()
        }
    }
}

// ── Axum extractors ──────────────────────────────────────────────────

/// Bearer token first, then the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    })
}

fn resolve_session(parts: &Parts, state: &AppState) -> AdminSession {
    match session_token(parts) {
        Some(token) => match state.keys.verify(&token) {
            Ok(_) => AdminSession::resumed(),
            Err(e) => {
                tracing::debug!("Ignoring session token: {e}");
                AdminSession::new()
            }
        },
        None => AdminSession::new(),
    }
}

/// The caller's session; anonymous when no valid token is presented.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub AdminSession);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(resolve_session(parts, state)))
    }
}

/// Requires an authenticated admin session; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser;

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if resolve_session(parts, state).is_authenticated() {
            Ok(AdminUser)
        } else {
            Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Admin login required" })),
            ))
        }
    }
}
