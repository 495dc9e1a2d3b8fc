// Local key-value slot: one JSON file per key inside a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::PersistenceAdapter;
use crate::contestant::Contestant;
use crate::error::PersistenceError;

pub struct LocalAdapter {
    dir: PathBuf,
    key: String,
}

impl LocalAdapter {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            key: key.to_string(),
        }
    }

    /// File backing the slot.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

#[async_trait]
impl PersistenceAdapter for LocalAdapter {
    async fn load(&self) -> Result<Vec<Contestant>, PersistenceError> {
        let contents = match tokio::fs::read(self.path()).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&contents)?)
    }

    async fn save(&self, contestants: &[Contestant]) -> Result<(), PersistenceError> {
        let body = serde_json::to_vec(contestants)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write beside the slot, then rename over it.
        let path = self.path();
        let tmp = self.dir.join(format!(".{}.json.tmp", self.key));
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local slot '{}' in {}", self.key, self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("leaderboard-local-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_slot_loads_empty() {
        let adapter = LocalAdapter::new(&scratch_dir(), "contestants");
        assert!(adapter.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = scratch_dir();
        let adapter = LocalAdapter::new(&dir, "contestants");
        let mut knocked = Contestant::new(2, "Bob", "");
        knocked.score = -3;
        knocked.active = false;
        let list = vec![Contestant::new(1, "Alice", "Red"), knocked];

        adapter.save(&list).await.unwrap();
        assert_eq!(adapter.load().await.unwrap(), list);
        assert!(adapter.path().exists());
        assert!(!dir.join(".contestants.json.tmp").exists());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_slot() {
        let dir = scratch_dir();
        let adapter = LocalAdapter::new(&dir, "board");
        adapter
            .save(&[Contestant::new(1, "A", ""), Contestant::new(2, "B", "")])
            .await
            .unwrap();
        adapter.save(&[Contestant::new(3, "C", "")]).await.unwrap();

        let loaded = adapter.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 3);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_malformed_slot_is_error() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("contestants.json"), "{not json").unwrap();

        let adapter = LocalAdapter::new(&dir, "contestants");
        let err = adapter.load().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Malformed(_)));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
