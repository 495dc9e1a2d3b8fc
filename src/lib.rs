pub mod api;
pub mod auth;
pub mod config;
pub mod contestant;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod session;
pub mod store;
pub mod view;

use std::sync::Arc;

use api::AppState;
use auth::SessionKeys;
use config::Config;
use error::PersistenceError;
use session::AdminGate;
use store::ContestantStore;

/// Build the adapter, store and session keys described by `config`, and
/// hydrate the store from its back end.
pub async fn build_state(config: &Config) -> Result<AppState, PersistenceError> {
    let adapter = persistence::from_config(&config.backend)?;
    let store = Arc::new(ContestantStore::new(adapter));
    store.load().await;

    Ok(AppState {
        store,
        gate: Arc::new(AdminGate::new(config.admin_password.clone())),
        keys: Arc::new(SessionKeys::new(&config.session_secret, config.session_ttl)),
    })
}
