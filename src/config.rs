// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_JSONBIN_BASE_URL: &str = "https://api.jsonbin.io/v3/b";
pub const DEFAULT_LOCAL_KEY: &str = "contestants";

/// Which persistence back end holds the contestant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Remote JSON document store (JSONBin compatible).
    Remote(RemoteConfig),
    /// A named slot in a local data directory.
    Local(LocalConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub bin_id: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
    pub dir: PathBuf,
    pub key: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    pub backend: BackendConfig,
    /// Shared admin secret. `None` means no password ever matches.
    pub admin_password: Option<String>,
    /// Secret used to sign session tokens. Random per process when unset.
    pub session_secret: Vec<u8>,
    pub session_ttl: chrono::Duration,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `LEADERBOARD_BACKEND` - `remote` or `local` (default: `local`)
    /// - `JSONBIN_API_KEY`, `JSONBIN_BIN_ID` - remote credential and document id
    /// - `JSONBIN_BASE_URL` - remote base (default: `https://api.jsonbin.io/v3/b`)
    /// - `REMOTE_TIMEOUT_MS` - remote request timeout (default: 5000)
    /// - `LOCAL_STORAGE_DIR` - local slot directory (default: `./data`)
    /// - `LOCAL_STORAGE_KEY` - local slot key (default: `contestants`)
    /// - `ADMIN_PASSWORD` - shared admin secret
    /// - `SESSION_SECRET` - session token signing secret
    /// - `SESSION_TTL_HOURS` - session lifetime (default: 24)
    /// - `PORT` - HTTP server port (default: 3000)
    ///
    /// CLI flags `--backend`, `--data-dir` and `--port` override their
    /// environment counterparts.
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |name| std::env::var(name).ok())
    }

    /// Build a configuration from CLI arguments and a variable lookup.
    pub fn from_sources<F>(args: &[String], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| env(name).filter(|v| !v.is_empty());

        let port = match Self::parse_cli_value(args, "--port").or_else(|| non_empty("PORT")) {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: v,
            })?,
            None => 3000,
        };

        let backend_name = Self::parse_cli_value(args, "--backend")
            .or_else(|| non_empty("LEADERBOARD_BACKEND"))
            .unwrap_or_else(|| "local".to_string());

        let backend = match backend_name.to_ascii_lowercase().as_str() {
            "remote" => {
                let api_key = non_empty("JSONBIN_API_KEY")
                    .ok_or(ConfigError::MissingRemoteSetting("JSONBIN_API_KEY"))?;
                let bin_id = non_empty("JSONBIN_BIN_ID")
                    .ok_or(ConfigError::MissingRemoteSetting("JSONBIN_BIN_ID"))?;
                let base_url = non_empty("JSONBIN_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_JSONBIN_BASE_URL.to_string());
                let timeout_ms = match non_empty("REMOTE_TIMEOUT_MS") {
                    Some(v) => v.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                        name: "REMOTE_TIMEOUT_MS",
                        value: v,
                    })?,
                    None => 5000,
                };
                BackendConfig::Remote(RemoteConfig {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    bin_id,
                    api_key,
                    timeout: Duration::from_millis(timeout_ms),
                })
            }
            "local" => {
                let dir = Self::parse_cli_value(args, "--data-dir")
                    .or_else(|| non_empty("LOCAL_STORAGE_DIR"))
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data"));
                let key = non_empty("LOCAL_STORAGE_KEY")
                    .unwrap_or_else(|| DEFAULT_LOCAL_KEY.to_string());
                BackendConfig::Local(LocalConfig { dir, key })
            }
            _ => return Err(ConfigError::UnknownBackend(backend_name)),
        };

        // An empty password would match an empty submission; treat it as unset.
        let admin_password = non_empty("ADMIN_PASSWORD");

        let session_secret = non_empty("SESSION_SECRET")
            .map(String::into_bytes)
            .unwrap_or_else(random_secret);

        let ttl_hours = match non_empty("SESSION_TTL_HOURS") {
            Some(v) => v.parse::<i64>().ok().filter(|h| *h > 0).ok_or(
                ConfigError::InvalidValue {
                    name: "SESSION_TTL_HOURS",
                    value: v,
                },
            )?,
            None => 24,
        };

        Ok(Config {
            port,
            backend,
            admin_password,
            session_secret,
            session_ttl: chrono::Duration::hours(ttl_hours),
        })
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

fn random_secret() -> Vec<u8> {
    use rand::RngCore;
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}
