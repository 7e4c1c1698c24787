//! The user's current search criteria.
//!
//! A [`FilterState`] is replaced, never mutated in place: every `with_*`
//! operation returns a new value and leaves the other fields alone. No
//! validation happens here; an inverted price range is kept as typed and
//! forwarded to the server unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower price bound used when nothing was restored.
pub const DEFAULT_PRICE_MIN: i64 = 1;
/// Upper price bound used when nothing was restored. Effectively unbounded.
pub const DEFAULT_PRICE_MAX: i64 = 99_999_999;

/// Wire value of the "all categories" sentinel in persisted state.
const ALL_SENTINEL: i64 = -1;

/// Category part of the filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCategory", into = "i64")]
pub enum CategorySelector {
    #[default]
    All,
    Id(i64),
}

impl CategorySelector {
    pub fn is_all(self) -> bool {
        matches!(self, Self::All)
    }

    /// Concrete category id, `None` for [`CategorySelector::All`].
    pub fn id(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Id(id) => Some(id),
        }
    }

    /// Parses user input: `all`, `-1` or a positive id.
    pub fn parse(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| format!("invalid category: {trimmed}"))?;
        Self::try_from(value)
    }
}

impl TryFrom<i64> for CategorySelector {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            ALL_SENTINEL => Ok(Self::All),
            id if id > 0 => Ok(Self::Id(id)),
            other => Err(format!("invalid category: {other}")),
        }
    }
}

impl From<CategorySelector> for i64 {
    fn from(selector: CategorySelector) -> Self {
        match selector {
            CategorySelector::All => ALL_SENTINEL,
            CategorySelector::Id(id) => id,
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

// Older slots stored the selected option's value, which could be a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategory {
    Number(i64),
    Text(String),
}

impl TryFrom<RawCategory> for CategorySelector {
    type Error = String;

    fn try_from(raw: RawCategory) -> Result<Self, Self::Error> {
        match raw {
            RawCategory::Number(value) => Self::try_from(value),
            RawCategory::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid category: {text}"))
                .and_then(Self::try_from),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategorySelector,
    /// Empty means "no keyword constraint".
    pub keyword: String,
    pub price_min: i64,
    pub price_max: i64,
    #[serde(rename = "is_include_soldout")]
    pub include_sold_out: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: CategorySelector::All,
            keyword: String::new(),
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
            include_sold_out: false,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(&self, category: CategorySelector) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    pub fn with_keyword(&self, keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..self.clone()
        }
    }

    pub fn with_price_min(&self, price_min: i64) -> Self {
        Self {
            price_min,
            ..self.clone()
        }
    }

    pub fn with_price_max(&self, price_max: i64) -> Self {
        Self {
            price_max,
            ..self.clone()
        }
    }

    pub fn with_include_sold_out(&self, include_sold_out: bool) -> Self {
        Self {
            include_sold_out,
            ..self.clone()
        }
    }

    /// Same as the matching `with_*` call.
    pub fn apply(&self, edit: FilterEdit) -> Self {
        match edit {
            FilterEdit::Category(category) => self.with_category(category),
            FilterEdit::Keyword(keyword) => self.with_keyword(keyword),
            FilterEdit::PriceMin(value) => self.with_price_min(value),
            FilterEdit::PriceMax(value) => self.with_price_max(value),
            FilterEdit::IncludeSoldOut(value) => self.with_include_sold_out(value),
        }
    }
}

/// A single-field edit coming from one control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterEdit {
    Category(CategorySelector),
    Keyword(String),
    PriceMin(i64),
    PriceMax(i64),
    IncludeSoldOut(bool),
}
