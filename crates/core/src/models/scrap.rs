use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category of a saved scrap, stored as a select in the Scraps collection.
///
/// The well-known categories map to the labels configured in the deployed
/// database. `Custom` carries any other label verbatim, since scraps saved
/// from a holding's news feed are filed under that holding's asset type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScrapCategory {
    MarketNews,
    CryptoNews,
    Research,
    AiAnalysis,
    #[default]
    Other,
    Custom(String),
}

impl ScrapCategory {
    const WELL_KNOWN: [ScrapCategory; 5] = [
        ScrapCategory::MarketNews,
        ScrapCategory::CryptoNews,
        ScrapCategory::Research,
        ScrapCategory::AiAnalysis,
        ScrapCategory::Other,
    ];

    /// The select option label sent to the store.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            ScrapCategory::MarketNews => "시장뉴스",
            ScrapCategory::CryptoNews => "코인뉴스",
            ScrapCategory::Research => "리서치",
            ScrapCategory::AiAnalysis => "AI분석",
            ScrapCategory::Other => "기타",
            ScrapCategory::Custom(label) => label,
        }
    }

    /// Resolve a select label. Empty labels become `Other`; labels outside
    /// the well-known set are kept as `Custom`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() {
            return ScrapCategory::Other;
        }
        Self::WELL_KNOWN
            .iter()
            .find(|c| c.label() == label)
            .cloned()
            .unwrap_or_else(|| ScrapCategory::Custom(label.to_string()))
    }
}

impl std::fmt::Display for ScrapCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A saved news item, research note or AI analysis in the Scraps collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scrap {
    pub title: String,

    /// Free-text reference to the asset this scrap is about (not a foreign key)
    #[serde(default)]
    pub asset_ref: String,

    #[serde(default)]
    pub category: ScrapCategory,

    /// Publisher or feed name
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Notion page id, assigned by the store on creation
    #[serde(default)]
    pub remote_id: Option<String>,
}

impl Scrap {
    /// Create a new, not yet persisted scrap dated today (UTC).
    pub fn new(title: impl Into<String>, category: ScrapCategory) -> Self {
        Self {
            title: title.into(),
            asset_ref: String::new(),
            category,
            source: String::new(),
            summary: String::new(),
            link: None,
            date: Some(chrono::Utc::now().date_naive()),
            remote_id: None,
        }
    }

    #[must_use]
    pub fn with_asset_ref(mut self, asset_ref: impl Into<String>) -> Self {
        self.asset_ref = asset_ref.into();
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Attach a link. An empty string clears it.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        let link = link.into();
        self.link = if link.trim().is_empty() { None } else { Some(link) };
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}
