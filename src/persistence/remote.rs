// Remote JSON document store (JSONBin v3 protocol).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::PersistenceAdapter;
use crate::config::RemoteConfig;
use crate::contestant::Contestant;
use crate::error::PersistenceError;

/// Body of `GET {bin}/latest`. Only `record` matters; metadata is ignored.
#[derive(Deserialize)]
struct LatestDocument {
    #[serde(default)]
    record: Option<Vec<Contestant>>,
}

/// Reads and overwrites a single remote document holding the contestant array.
pub struct RemoteDocumentAdapter {
    client: Client,
    document_url: String,
    api_key: String,
}

impl RemoteDocumentAdapter {
    pub fn new(config: &RemoteConfig) -> Result<Self, PersistenceError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            document_url: format!("{}/{}", config.base_url, config.bin_id),
            api_key: config.api_key.clone(),
        })
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }
}

#[async_trait]
impl PersistenceAdapter for RemoteDocumentAdapter {
    async fn load(&self) -> Result<Vec<Contestant>, PersistenceError> {
        let response = self
            .client
            .get(format!("{}/latest", self.document_url))
            .header("X-Master-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let document: LatestDocument = serde_json::from_slice(&body)?;
        Ok(document.record.unwrap_or_default())
    }

    async fn save(&self, contestants: &[Contestant]) -> Result<(), PersistenceError> {
        let body = serde_json::to_vec(contestants)?;
        self.client
            .put(&self.document_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("X-Master-Key", &self.api_key)
            .header("X-Bin-Versioning", "false")
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("remote document {}", self.document_url)
    }
}
