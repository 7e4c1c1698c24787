//! Translation of a filter into the parameters of `GET /search-detail`.
//!
//! Values are forwarded verbatim; the only encoding applied is the URL
//! encoding done by [`QuerySpec::append_to`]. The `category` key is left out
//! entirely for [`CategorySelector::All`]: the server reads a missing key as
//! "any category".
//!
//! [`CategorySelector::All`]: crate::filter::CategorySelector::All

use std::fmt;

use reqwest::Url;

use crate::filter::FilterState;

pub const KEY_CATEGORY: &str = "category";
pub const KEY_NAME: &str = "name";
pub const KEY_PRICE_MIN: &str = "price-min";
pub const KEY_PRICE_MAX: &str = "price-max";
pub const KEY_INCLUDE_SOLD_OUT: &str = "is-include-soldout";

/// Ordered key/value pairs sent to the search endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySpec {
    pairs: Vec<(&'static str, String)>,
}

impl QuerySpec {
    pub fn build(state: &FilterState) -> Self {
        let mut pairs = Vec::with_capacity(5);
        if let Some(id) = state.category.id() {
            pairs.push((KEY_CATEGORY, id.to_string()));
        }
        pairs.push((KEY_NAME, state.keyword.clone()));
        pairs.push((KEY_PRICE_MIN, state.price_min.to_string()));
        pairs.push((KEY_PRICE_MAX, state.price_max.to_string()));
        pairs.push((KEY_INCLUDE_SOLD_OUT, state.include_sold_out.to_string()));
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Appends the pairs to `url`, URL-encoding the values.
    pub fn append_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
}

/// Unencoded `k=v&k=v` form, for logs.
impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
