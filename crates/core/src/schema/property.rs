use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Notion caps a single rich-text object at 2000 characters, counted in
/// UTF-16 code units.
pub const MAX_TEXT_SEGMENT_CHARS: usize = 2000;

/// Notion caps a rich-text array at 100 objects.
pub const MAX_TEXT_SEGMENTS: usize = 100;

/// Longest string a title or rich-text property can carry.
pub const MAX_TEXT_CHARS: usize = MAX_TEXT_SEGMENT_CHARS * MAX_TEXT_SEGMENTS;

/// Notion caps url properties at 2000 characters (UTF-16 code units).
pub const MAX_URL_CHARS: usize = 2000;

/// Property name → typed value, as carried by a page.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A typed page property, one variant per Notion property type this crate uses.
///
/// Deserializes from the response shape, where the type travels in a
/// `"type"` tag next to the value (`{"id":"x","type":"number","number":2}`).
/// Serializes to the request shape, which is just the value keyed by its
/// type (`{"number":2}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default, deserialize_with = "null_as_default")]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default, deserialize_with = "null_as_default")]
        rich_text: Vec<RichText>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    /// Any property type this crate never writes (formula, checkbox, people, ...).
    #[serde(other)]
    Unsupported,
}

/// One element of a title / rich-text array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,

    /// Rendered text; present in responses only (mentions and equations have no `text`).
    #[serde(default, skip_serializing)]
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    fn plain(content: &str) -> Self {
        Self {
            text: Some(TextContent {
                content: content.to_string(),
            }),
            plain_text: None,
        }
    }

    /// The visible text of this element.
    pub fn as_str(&self) -> &str {
        self.plain_text
            .as_deref()
            .or_else(|| self.text.as_ref().map(|t| t.content.as_str()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    /// ISO-8601 date or date-time.
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl PropertyValue {
    // ── Constructors ────────────────────────────────────────────────

    pub fn title(text: &str) -> Self {
        PropertyValue::Title {
            title: segments(text),
        }
    }

    pub fn rich_text(text: &str) -> Self {
        PropertyValue::RichText {
            rich_text: segments(text),
        }
    }

    pub fn number(value: f64) -> Self {
        PropertyValue::Number {
            number: Some(value),
        }
    }

    pub fn select(label: &str) -> Self {
        PropertyValue::Select {
            select: Some(SelectOption {
                name: label.to_string(),
            }),
        }
    }

    /// A start-only date; `None` clears the property.
    pub fn date(date: Option<NaiveDate>) -> Self {
        PropertyValue::Date {
            date: date.map(|d| DateValue {
                start: d.format("%Y-%m-%d").to_string(),
                end: None,
            }),
        }
    }

    /// `None` clears the property.
    pub fn url(url: Option<&str>) -> Self {
        PropertyValue::Url {
            url: url.map(str::to_string),
        }
    }

    // ── Readers (absent or mismatched values read as defaults) ──────

    /// Concatenated text of a title or rich-text property.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            PropertyValue::Title { title: items } | PropertyValue::RichText { rich_text: items } => {
                items.iter().map(RichText::as_str).collect()
            }
            _ => String::new(),
        }
    }

    #[must_use]
    pub fn as_number(&self) -> f64 {
        match self {
            PropertyValue::Number { number } => number.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn as_select(&self) -> &str {
        match self {
            PropertyValue::Select {
                select: Some(option),
            } => &option.name,
            _ => "",
        }
    }

    /// Start date of a date property. Date-times are truncated to their date.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            PropertyValue::Date { date: Some(value) } => {
                let day = value.start.get(..10).unwrap_or(&value.start);
                NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn as_url(&self) -> Option<&str> {
        match self {
            PropertyValue::Url { url: Some(url) } if !url.is_empty() => Some(url),
            _ => None,
        }
    }

    /// The Notion type name of this value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Title { .. } => "title",
            PropertyValue::RichText { .. } => "rich_text",
            PropertyValue::Number { .. } => "number",
            PropertyValue::Select { .. } => "select",
            PropertyValue::Date { .. } => "date",
            PropertyValue::Url { .. } => "url",
            PropertyValue::Unsupported => "unsupported",
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            PropertyValue::Title { title } => map.serialize_entry("title", title)?,
            PropertyValue::RichText { rich_text } => map.serialize_entry("rich_text", rich_text)?,
            PropertyValue::Number { number } => map.serialize_entry("number", number)?,
            PropertyValue::Select { select } => map.serialize_entry("select", select)?,
            PropertyValue::Date { date } => map.serialize_entry("date", date)?,
            PropertyValue::Url { url } => map.serialize_entry("url", url)?,
            PropertyValue::Unsupported => {
                return Err(S::Error::custom("unsupported property types cannot be written"))
            }
        }
        map.end()
    }
}

/// Length as Notion counts it: UTF-16 code units, so an emoji outside the
/// basic plane counts twice.
#[must_use]
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Split text into rich-text objects no longer than the per-object limit.
/// Splits fall on char boundaries. Empty text becomes an empty array,
/// which Notion stores as an empty value.
fn segments(text: &str) -> Vec<RichText> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        if units + c.len_utf16() > MAX_TEXT_SEGMENT_CHARS {
            out.push(RichText::plain(&text[start..idx]));
            start = idx;
            units = 0;
        }
        units += c.len_utf16();
    }
    if start < text.len() {
        out.push(RichText::plain(&text[start..]));
    }
    out
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

