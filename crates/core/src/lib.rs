pub mod config;
pub mod errors;
pub mod models;
pub mod schema;
pub mod services;
pub mod transport;

use std::sync::Arc;

use config::AppConfig;
use errors::CoreError;
use models::{holding::Holding, scrap::Scrap};
use services::repository::Repository;
use transport::{http::HttpTransport, retry::RetryPolicy, traits::NotionTransport};

/// Main entry point for the portfolio-notion core library.
/// Owns one repository per collection, sharing a single transport.
#[must_use]
pub struct PortfolioStore {
    holdings: Repository<Holding>,
    scraps: Repository<Scrap>,
}

impl std::fmt::Debug for PortfolioStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioStore")
            .field("holdings_db", &self.holdings.database_id())
            .field("scraps_db", &self.scraps.database_id())
            .finish()
    }
}

impl PortfolioStore {
    /// Build the store against the real Notion API.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let transport: Arc<dyn NotionTransport> = Arc::new(HttpTransport::new(config)?);
        Self::with_transport(
            transport,
            &config.holdings_db_id,
            &config.scraps_db_id,
            config.retry,
        )
    }

    /// Build the store over any transport (test doubles, proxies, ...).
    pub fn with_transport(
        transport: Arc<dyn NotionTransport>,
        holdings_db_id: &str,
        scraps_db_id: &str,
        retry: RetryPolicy,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            holdings: Repository::new(Arc::clone(&transport), holdings_db_id, retry)?,
            scraps: Repository::new(transport, scraps_db_id, retry)?,
        })
    }

    #[must_use]
    pub fn holdings(&self) -> &Repository<Holding> {
        &self.holdings
    }

    #[must_use]
    pub fn scraps(&self) -> &Repository<Scrap> {
        &self.scraps
    }

    // ── Holdings ────────────────────────────────────────────────────

    pub async fn list_holdings(&self) -> Result<Vec<Holding>, CoreError> {
        self.holdings.list_all().await
    }

    pub async fn add_holding(&self, holding: &Holding) -> Result<Holding, CoreError> {
        self.holdings.create(holding).await
    }

    /// Re-send every field of `holding` to the row it was loaded from.
    pub async fn update_holding(&self, holding: &Holding) -> Result<Holding, CoreError> {
        let remote_id = require_remote_id(holding.remote_id.as_deref())?;
        self.holdings.update(remote_id, holding).await
    }

    pub async fn remove_holding(&self, remote_id: &str) -> Result<(), CoreError> {
        self.holdings.delete(remote_id).await
    }

    // ── Scraps ──────────────────────────────────────────────────────

    /// All scraps, newest first.
    pub async fn list_scraps(&self) -> Result<Vec<Scrap>, CoreError> {
        self.scraps.list_all().await
    }

    pub async fn add_scrap(&self, scrap: &Scrap) -> Result<Scrap, CoreError> {
        self.scraps.create(scrap).await
    }

    /// Re-send every field of `scrap` to the row it was loaded from.
    pub async fn update_scrap(&self, scrap: &Scrap) -> Result<Scrap, CoreError> {
        let remote_id = require_remote_id(scrap.remote_id.as_deref())?;
        self.scraps.update(remote_id, scrap).await
    }

    pub async fn delete_scrap(&self, remote_id: &str) -> Result<(), CoreError> {
        self.scraps.delete(remote_id).await
    }
}

fn require_remote_id(remote_id: Option<&str>) -> Result<&str, CoreError> {
    remote_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CoreError::validation("remote_id", "record has not been saved yet"))
}
