//! Narrowing and ordering of equivalence results by store, gender and price.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer};

use crate::storage::Equivalence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Cheapest first, unpriced last
    Price,
}

/// Optional refinements; an unset field does not filter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refinement {
    pub store: Option<String>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_price: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_price: Option<f64>,
    pub sort: Option<SortOrder>,
}

/// Parse the lower bound of a display price such as `"19,95 € – 29,95 €"`
pub fn parse_price(raw: &str) -> Option<f64> {
    let lower = raw.split('–').next()?;
    let cleaned = lower.replace('€', "").replace(',', ".");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}

impl Refinement {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn admits(&self, record: &Equivalence) -> bool {
        if let Some(store) = non_blank(self.store.as_deref()) {
            if record.store != store {
                return false;
            }
        }
        if let Some(gender) = non_blank(self.gender.as_deref()) {
            if record.gender != gender {
                return false;
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = parse_price(&record.price) else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, mut records: Vec<Equivalence>) -> Vec<Equivalence> {
        records.retain(|record| self.admits(record));

        if self.sort == Some(SortOrder::Price) {
            records.sort_by(|a, b| compare_prices(parse_price(&a.price), parse_price(&b.price)));
        }

        records
    }
}

fn compare_prices(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `minPrice=` means no bound; anything else must parse as a number
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid price {value:?}: {e}"))),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
