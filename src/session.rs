// Admin session: a two-state gate opened by the shared admin password.
//
// Anonymous -> Authenticated on an exact match; there is no way back. The
// secret is compared as plain text, which is only as strong as the secrecy of
// the deployment's configuration.

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Holds the configured admin secret.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Whether any password can ever be accepted.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Exact, case-sensitive comparison. Always false without a secret.
    pub fn accepts(&self, submitted: &str) -> bool {
        self.secret.as_deref() == Some(submitted)
    }
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    state: SessionState,
}

impl AdminSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Anonymous,
        }
    }

    /// A session restored from proof of an earlier successful login.
    pub(crate) fn resumed() -> Self {
        Self {
            state: SessionState::Authenticated,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Try to authenticate. On mismatch the state is left as it was.
    pub fn login(&mut self, submitted: &str, gate: &AdminGate) -> Result<(), SessionError> {
        if gate.accepts(submitted) {
            self.state = SessionState::Authenticated;
            Ok(())
        } else {
            Err(SessionError::AuthMismatch)
        }
    }
}

impl Default for AdminSession {
    fn default() -> Self {
        Self::new()
    }
}
