use log::warn;

use crate::errors::CoreError;
use crate::models::holding::{AssetType, Holding};
use crate::models::scrap::{Scrap, ScrapCategory};

use super::page::{Page, Sort};
use super::property::{utf16_len, PropertyMap, PropertyValue, MAX_TEXT_CHARS, MAX_URL_CHARS};
use super::Collection;

/// Notion caps select option names at 100 characters (UTF-16 code units).
const MAX_SELECT_CHARS: usize = 100;

/// Column names of the deployed Holdings database.
pub mod holding_columns {
    pub const TICKER: &str = "티커";
    pub const NAME: &str = "종목명";
    pub const QUANTITY: &str = "수량";
    pub const AVG_PRICE: &str = "평균단가";
    pub const ASSET_TYPE: &str = "자산유형";
    pub const MEMO: &str = "메모";
    pub const ADDED_ON: &str = "추가일";
}

/// Column names of the deployed Scraps database.
pub mod scrap_columns {
    pub const TITLE: &str = "제목";
    pub const ASSET_REF: &str = "자산";
    pub const CATEGORY: &str = "카테고리";
    pub const SOURCE: &str = "출처";
    pub const SUMMARY: &str = "요약";
    pub const LINK: &str = "링크";
    pub const DATE: &str = "날짜";
}

/// A record that lives as a page in one Notion collection.
///
/// Implementors define the two directions of the mapping; validation runs
/// before every encode so that an invalid record never reaches the wire.
pub trait RemoteRecord: Clone + Send + Sync + Sized + 'static {
    const COLLECTION: Collection;

    /// Reject records the store must not receive. Errors name the field.
    fn validate(&self) -> Result<(), CoreError>;

    /// Encode every field. Only called on validated records.
    fn encode_properties(&self) -> PropertyMap;

    /// Decode a page. Absent or null properties read as defaults; an empty
    /// required key is a `Validation` error.
    fn from_remote_page(page: &Page) -> Result<Self, CoreError>;

    fn remote_id(&self) -> Option<&str>;

    fn set_remote_id(&mut self, id: String);

    /// Store-side ordering used when listing the collection.
    fn list_sorts() -> Vec<Sort> {
        Vec::new()
    }

    /// Validate, then encode the full property set.
    fn to_remote_properties(&self) -> Result<PropertyMap, CoreError> {
        self.validate()?;
        Ok(self.encode_properties())
    }
}

// ── Holding ─────────────────────────────────────────────────────────

impl RemoteRecord for Holding {
    const COLLECTION: Collection = Collection::Holdings;

    fn validate(&self) -> Result<(), CoreError> {
        require_text("ticker", &self.ticker)?;
        check_text("ticker", &self.ticker)?;
        check_text("name", &self.name)?;
        check_text("memo", &self.memo)?;
        check_amount("quantity", self.quantity)?;
        check_amount("avg_price", self.avg_price)?;
        Ok(())
    }

    fn encode_properties(&self) -> PropertyMap {
        use holding_columns::*;
        PropertyMap::from([
            (TICKER.to_string(), PropertyValue::title(&self.ticker)),
            (NAME.to_string(), PropertyValue::rich_text(&self.name)),
            (QUANTITY.to_string(), PropertyValue::number(self.quantity)),
            (AVG_PRICE.to_string(), PropertyValue::number(self.avg_price)),
            (ASSET_TYPE.to_string(), PropertyValue::select(self.asset_type.label())),
            (MEMO.to_string(), PropertyValue::rich_text(&self.memo)),
            (ADDED_ON.to_string(), PropertyValue::date(self.added_on)),
        ])
    }

    fn from_remote_page(page: &Page) -> Result<Self, CoreError> {
        use holding_columns::*;
        let ticker = text_of(page, TICKER);
        require_text("ticker", &ticker)?;

        let label = select_of(page, ASSET_TYPE);
        let asset_type = if label.is_empty() {
            AssetType::default()
        } else {
            AssetType::from_label(label).unwrap_or_else(|| {
                warn!("Holding {} has unknown asset type '{label}', treating as other", page.id);
                AssetType::Other
            })
        };

        Ok(Holding {
            ticker,
            name: text_of(page, NAME),
            quantity: number_of(page, QUANTITY),
            avg_price: number_of(page, AVG_PRICE),
            asset_type,
            memo: text_of(page, MEMO),
            added_on: page.property(ADDED_ON).and_then(PropertyValue::as_date),
            remote_id: Some(page.id.clone()),
        })
    }

    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    fn set_remote_id(&mut self, id: String) {
        self.remote_id = Some(id);
    }
}

// ── Scrap ───────────────────────────────────────────────────────────

impl RemoteRecord for Scrap {
    const COLLECTION: Collection = Collection::Scraps;

    fn validate(&self) -> Result<(), CoreError> {
        require_text("title", &self.title)?;
        check_text("title", &self.title)?;
        check_text("asset_ref", &self.asset_ref)?;
        check_text("source", &self.source)?;
        check_text("summary", &self.summary)?;
        check_category(&self.category)?;
        if let Some(link) = &self.link {
            check_link(link)?;
        }
        Ok(())
    }

    fn encode_properties(&self) -> PropertyMap {
        use scrap_columns::*;
        PropertyMap::from([
            (TITLE.to_string(), PropertyValue::title(&self.title)),
            (ASSET_REF.to_string(), PropertyValue::rich_text(&self.asset_ref)),
            (CATEGORY.to_string(), PropertyValue::select(self.category.label())),
            (SOURCE.to_string(), PropertyValue::rich_text(&self.source)),
            (SUMMARY.to_string(), PropertyValue::rich_text(&self.summary)),
            (LINK.to_string(), PropertyValue::url(self.link.as_deref())),
            (DATE.to_string(), PropertyValue::date(self.date)),
        ])
    }

    fn from_remote_page(page: &Page) -> Result<Self, CoreError> {
        use scrap_columns::*;
        let title = text_of(page, TITLE);
        require_text("title", &title)?;

        Ok(Scrap {
            title,
            asset_ref: text_of(page, ASSET_REF),
            category: ScrapCategory::from_label(select_of(page, CATEGORY)),
            source: text_of(page, SOURCE),
            summary: text_of(page, SUMMARY),
            link: page
                .property(LINK)
                .and_then(PropertyValue::as_url)
                .map(str::to_string),
            date: page.property(DATE).and_then(PropertyValue::as_date),
            remote_id: Some(page.id.clone()),
        })
    }

    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    fn set_remote_id(&mut self, id: String) {
        self.remote_id = Some(id);
    }

    /// Newest scraps first.
    fn list_sorts() -> Vec<Sort> {
        vec![Sort::descending(scrap_columns::DATE)]
    }
}

// ── Decoding helpers ────────────────────────────────────────────────

fn text_of(page: &Page, column: &str) -> String {
    page.property(column)
        .map(PropertyValue::plain_text)
        .unwrap_or_default()
}

fn number_of(page: &Page, column: &str) -> f64 {
    page.property(column).map_or(0.0, PropertyValue::as_number)
}

fn select_of<'a>(page: &'a Page, column: &str) -> &'a str {
    page.property(column).map_or("", PropertyValue::as_select)
}

// ── Validation helpers ──────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn check_text(field: &str, value: &str) -> Result<(), CoreError> {
    let len = utf16_len(value);
    if len > MAX_TEXT_CHARS {
        return Err(CoreError::validation(
            field,
            format!("is {len} characters long, the limit is {MAX_TEXT_CHARS}"),
        ));
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::validation(
            field,
            format!("must be a finite number ≥ 0, got {value}"),
        ));
    }
    Ok(())
}

fn check_category(category: &ScrapCategory) -> Result<(), CoreError> {
    let label = category.label();
    if label.trim().is_empty() {
        return Err(CoreError::validation("category", "must not be empty"));
    }
    if label.trim() != label {
        return Err(CoreError::validation(
            "category",
            format!("must not start or end with whitespace: '{label}'"),
        ));
    }
    if label.contains(',') {
        return Err(CoreError::validation(
            "category",
            format!("select options cannot contain commas: '{label}'"),
        ));
    }
    if utf16_len(label) > MAX_SELECT_CHARS {
        return Err(CoreError::validation(
            "category",
            format!("must be at most {MAX_SELECT_CHARS} characters"),
        ));
    }
    // A custom label naming a well-known category would read back as that category.
    if ScrapCategory::from_label(label) != *category {
        return Err(CoreError::validation(
            "category",
            format!("'{label}' is a built-in category, use it instead of a custom one"),
        ));
    }
    Ok(())
}

fn check_link(link: &str) -> Result<(), CoreError> {
    if utf16_len(link) > MAX_URL_CHARS {
        return Err(CoreError::validation(
            "link",
            format!("must be at most {MAX_URL_CHARS} characters"),
        ));
    }
    let url = reqwest::Url::parse(link)
        .map_err(|e| CoreError::validation("link", format!("'{link}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::validation(
            "link",
            format!("'{link}' must use http or https"),
        ));
    }
    Ok(())
}
