use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ticker suffixes that mark a crypto pair (e.g. "BTC-USD").
const CRYPTO_SUFFIXES: [&str; 4] = ["-USD", "-KRW", "-USDT", "-BTC"];

/// Bare symbols treated as crypto even without a pair suffix.
const CRYPTO_SYMBOLS: [&str; 13] = [
    "BTC", "ETH", "XRP", "SOL", "ADA", "DOGE", "DOT", "MATIC", "AVAX", "LINK", "BNB", "TRX", "SUI",
];

/// The category of a holding, stored in the Holdings collection as a select.
///
/// Each variant maps to exactly one select option label configured in the
/// deployed Notion database. Sending any other label makes Notion create a
/// new option silently, so [`AssetType::label`] must mirror the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AssetType {
    /// Korean listed equities (".KS" / ".KQ" tickers)
    DomesticEquity,
    /// US and other foreign equities, the deployed default
    #[default]
    ForeignEquity,
    Etf,
    Crypto,
    Bond,
    Commodity,
    Other,
}

impl AssetType {
    /// All variants in the order the select options are configured.
    pub const ALL: [AssetType; 7] = [
        AssetType::DomesticEquity,
        AssetType::ForeignEquity,
        AssetType::Etf,
        AssetType::Crypto,
        AssetType::Bond,
        AssetType::Commodity,
        AssetType::Other,
    ];

    /// The exact select option label in the Holdings database.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AssetType::DomesticEquity => "한국주식",
            AssetType::ForeignEquity => "미국주식",
            AssetType::Etf => "ETF",
            AssetType::Crypto => "암호화폐",
            AssetType::Bond => "채권",
            AssetType::Commodity => "원자재",
            AssetType::Other => "기타",
        }
    }

    /// Resolve a select label back to a variant. Unknown labels yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Guess the asset type from the shape of a ticker symbol.
    ///
    /// Korean exchange suffixes are domestic equity, crypto pairs and
    /// well-known coin symbols are crypto, everything else is foreign equity.
    #[must_use]
    pub fn detect(ticker: &str) -> Self {
        let t = ticker.trim().to_uppercase();
        if t.ends_with(".KS") || t.ends_with(".KQ") {
            return AssetType::DomesticEquity;
        }
        if CRYPTO_SUFFIXES.iter().any(|s| t.ends_with(s)) || CRYPTO_SYMBOLS.contains(&t.as_str()) {
            return AssetType::Crypto;
        }
        AssetType::ForeignEquity
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One position in the Holdings collection.
///
/// Holdings are not unique by ticker: the store keeps whatever rows the
/// user adds, and the same ticker may appear more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, trimmed and uppercased (e.g. "AAPL", "005930.KS", "BTC-USD")
    pub ticker: String,

    /// Display name (e.g. "Apple Inc."), empty when unknown
    #[serde(default)]
    pub name: String,

    pub quantity: f64,

    /// Average purchase price per unit
    pub avg_price: f64,

    pub asset_type: AssetType,

    #[serde(default)]
    pub memo: String,

    /// Date the holding was added; `None` when the store row has no date
    #[serde(default)]
    pub added_on: Option<NaiveDate>,

    /// Notion page id, assigned by the store on creation
    #[serde(default)]
    pub remote_id: Option<String>,
}

impl Holding {
    /// Create a new, not yet persisted holding dated today (UTC).
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        quantity: f64,
        avg_price: f64,
        asset_type: AssetType,
    ) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            name: name.into(),
            quantity,
            avg_price,
            asset_type,
            memo: String::new(),
            added_on: Some(chrono::Utc::now().date_naive()),
            remote_id: None,
        }
    }

    /// Attach a free-text memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Override the date the holding was added.
    #[must_use]
    pub fn with_added_on(mut self, date: NaiveDate) -> Self {
        self.added_on = Some(date);
        self
    }

    /// Total cost basis (quantity × average price).
    #[must_use]
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.avg_price
    }
}
