use std::time::Duration;

use crate::errors::CoreError;
use crate::schema::Collection;
use crate::transport::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// API version sent in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2022-06-28";

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const MODEL_API_KEY: &str = "GEMINI_API_KEY";
pub const NOTION_API_KEY: &str = "NOTION_API_KEY";
pub const NOTION_BASE_URL: &str = "NOTION_BASE_URL";

/// Process-wide settings, read once at startup and never mutated.
///
/// Repositories receive a reference at construction time; no operation
/// reads the environment on its own.
#[derive(Clone)]
pub struct AppConfig {
    /// Key for the hosted model API, consumed by the AI summarizer.
    pub model_api_key: String,
    pub notion_api_key: String,
    pub holdings_db_id: String,
    pub scraps_db_id: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("model_api_key", &"<redacted>")
            .field("notion_api_key", &"<redacted>")
            .field("holdings_db_id", &self.holdings_db_id)
            .field("scraps_db_id", &self.scraps_db_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self, CoreError> {
        // A missing .env is normal in deployed environments.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key → value source (secret store, test map, ...).
    ///
    /// Fails with `Configuration` listing every missing setting.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| is_set(v)).map(|v| v.trim().to_string());

        let required = [
            MODEL_API_KEY,
            NOTION_API_KEY,
            Collection::Holdings.env_key(),
            Collection::Scraps.env_key(),
        ];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|&key| read(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Configuration(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        let base_url = match read(NOTION_BASE_URL) {
            Some(url) => {
                reqwest::Url::parse(&url).map_err(|e| {
                    CoreError::Configuration(format!("{NOTION_BASE_URL} '{url}' is not a valid URL: {e}"))
                })?;
                url.trim_end_matches('/').to_string()
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        Ok(Self {
            model_api_key: read(MODEL_API_KEY).unwrap_or_default(),
            notion_api_key: read(NOTION_API_KEY).unwrap_or_default(),
            holdings_db_id: read(Collection::Holdings.env_key()).unwrap_or_default(),
            scraps_db_id: read(Collection::Scraps.env_key()).unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        })
    }

    /// Database id of a collection.
    #[must_use]
    pub fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Holdings => &self.holdings_db_id,
            Collection::Scraps => &self.scraps_db_id,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Which settings are present, for a "connection" badge in the UI.
/// Only checks configuration; never touches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub model_api_key: bool,
    pub store_api_key: bool,
    pub holdings_db: bool,
    pub scraps_db: bool,
}

impl ConnectionStatus {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let has = |key: &str| lookup(key).is_some_and(|v| is_set(&v));
        Self {
            model_api_key: has(MODEL_API_KEY),
            store_api_key: has(NOTION_API_KEY),
            holdings_db: has(Collection::Holdings.env_key()),
            scraps_db: has(Collection::Scraps.env_key()),
        }
    }

    /// Whether a collection can be used: it needs both the store key and its id.
    #[must_use]
    pub fn is_configured(&self, collection: Collection) -> bool {
        self.store_api_key
            && match collection {
                Collection::Holdings => self.holdings_db,
                Collection::Scraps => self.scraps_db,
            }
    }

    #[must_use]
    pub fn fully_ready(&self) -> bool {
        self.model_api_key && self.store_api_key && self.holdings_db && self.scraps_db
    }
}

/// Empty values and untouched template placeholders ("your_...") count as unset.
fn is_set(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.starts_with("your_")
}
