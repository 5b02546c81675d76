use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A priced record displayed and edited in the table.
///
/// Display fields are opaque to the client and round-trip untouched: an
/// absent field stays absent, and any field the server sends that is not
/// modelled here is kept in `extra` so a full-replace save never drops it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL of the item's display image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Create an item with only an id and a price.
    pub fn new(id: impl Into<ItemId>, price: impl Into<Price>) -> Self {
        Self {
            id: id.into(),
            name: None,
            image: None,
            category: None,
            label: None,
            price: price.into(),
            description: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Opaque item identity.
///
/// The API may use JSON numbers or strings for ids. Both forms are kept as
/// received, so any id round-trips. A numeric id and a string id are equal
/// when the string is the number's canonical form (`"7"` matches `7`, `"007"`
/// does not), so ids typed by a user match either.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(Number),
    Text(String),
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(n), Self::Text(s)) | (Self::Text(s), Self::Number(n)) => {
                n.to_string() == *s
            }
        }
    }
}

impl Eq for ItemId {}

impl ItemId {
    /// Read a typed id. Only a number's canonical form becomes
    /// [`ItemId::Number`]; anything else, `"007"` included, stays text.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match serde_json::from_str::<Number>(s) {
            Ok(n) if n.to_string() == s => Self::Number(n),
            _ => Self::Text(s.to_string()),
        }
    }

    /// Numeric ids sort numerically, everything else by text.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => number_cmp(a, b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

fn number_cmp(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Text that could not be read as a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Price must be a number: {input:?}")]
pub struct PriceParseError {
    pub input: String,
}

/// A numeric price.
///
/// Stored as a JSON number so integer prices stay integers on the wire.
/// Deserialization also accepts numeric strings, which some clients write
/// back when a form field is saved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Price(Number);

impl Price {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    /// Total numeric ordering, for sorting.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        self.as_f64().total_cmp(&other.as_f64())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(Self(Number::from(n)));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Self)
            .ok_or_else(|| PriceParseError {
                input: s.to_string(),
            })
    }
}

impl From<i64> for Price {
    fn from(n: i64) -> Self {
        Self(Number::from(n))
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .map(Self)
            .ok_or_else(|| PriceParseError {
                input: value.to_string(),
            })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(Number),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(n) => Ok(Self(n)),
            RawPrice::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
