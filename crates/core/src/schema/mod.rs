//! Translation between in-memory records and Notion's typed page properties.

pub mod mapper;
pub mod page;
pub mod property;

/// The two logical collections kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Holdings,
    Scraps,
}

impl Collection {
    /// Environment variable holding this collection's database id.
    #[must_use]
    pub fn env_key(&self) -> &'static str {
        match self {
            Collection::Holdings => "NOTION_PORTFOLIO_DB_ID",
            Collection::Scraps => "NOTION_SCRAP_DB_ID",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Holdings => write!(f, "Holdings"),
            Collection::Scraps => write!(f, "Scraps"),
        }
    }
}
