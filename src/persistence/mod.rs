// Persistence back ends for the contestant list.
//
// Every save is a total overwrite of the stored collection; there is no
// per-record addressing, versioning or compare-and-swap.

pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::contestant::Contestant;
use crate::error::PersistenceError;

pub use local::LocalAdapter;
pub use remote::RemoteDocumentAdapter;

/// Port for loading and saving the whole contestant collection.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Read the stored collection. A store that holds nothing yet yields an
    /// empty list, not an error.
    async fn load(&self) -> Result<Vec<Contestant>, PersistenceError>;

    /// Replace the stored collection with `contestants`.
    async fn save(&self, contestants: &[Contestant]) -> Result<(), PersistenceError>;

    /// Short description for logs and the health endpoint.
    fn describe(&self) -> String;
}

/// Build the adapter selected by configuration.
pub fn from_config(backend: &BackendConfig) -> Result<Arc<dyn PersistenceAdapter>, PersistenceError> {
    let adapter: Arc<dyn PersistenceAdapter> = match backend {
        BackendConfig::Remote(remote) => Arc::new(RemoteDocumentAdapter::new(remote)?),
        BackendConfig::Local(local) => Arc::new(LocalAdapter::new(&local.dir, &local.key)),
    };
    Ok(adapter)
}
