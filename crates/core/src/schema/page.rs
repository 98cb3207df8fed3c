use serde::{Deserialize, Serialize};

use super::property::{PropertyMap, PropertyValue};

/// Largest page size the query endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A Notion page (one row of a collection) as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    pub id: String,

    #[serde(default)]
    pub archived: bool,

    /// Newer API versions report trashed pages separately from archived ones.
    #[serde(default)]
    pub in_trash: bool,

    #[serde(default)]
    pub parent: Option<PageParent>,

    #[serde(default)]
    pub properties: PropertyMap,
}

/// Where a page lives. Only database parents matter here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageParent {
    #[serde(default)]
    pub database_id: Option<String>,
}

impl Page {
    pub fn new(id: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            id: id.into(),
            archived: false,
            in_trash: false,
            parent: None,
            properties,
        }
    }

    /// Look up a property by its column name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Whether the page belongs to the given database. Pages without a
    /// reported parent are assumed to match. Ids compare without dashes.
    #[must_use]
    pub fn belongs_to(&self, database_id: &str) -> bool {
        match self.parent.as_ref().and_then(|p| p.database_id.as_deref()) {
            Some(parent) => normalize_id(parent) == normalize_id(database_id),
            None => true,
        }
    }

    /// Whether the page has been deleted (archived or moved to trash).
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.archived || self.in_trash
    }
}

fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Store-side ordering applied to a collection query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Body of `POST /databases/{id}/query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "no_sorts")]
    pub sorts: &'a [Sort],
}

fn no_sorts(sorts: &&[Sort]) -> bool {
    sorts.is_empty()
}

#[derive(Debug, Clone, Serialize)]
pub struct Parent<'a> {
    pub database_id: &'a str,
}

/// Body of `POST /pages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePageRequest<'a> {
    pub parent: Parent<'a>,
    pub properties: &'a PropertyMap,
}

/// Body of `PATCH /pages/{id}` when replacing properties.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePageRequest<'a> {
    pub properties: &'a PropertyMap,
}

/// Body of `PATCH /pages/{id}` when archiving.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivePageRequest {
    pub archived: bool,
}

// ── Response bodies ─────────────────────────────────────────────────

/// One page of query results. Rows are kept as raw JSON so a single
/// malformed row can be skipped without losing the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Error envelope returned with every non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
