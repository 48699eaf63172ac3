use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Anything the merger can key by identifier
pub trait Record {
    /// `None` when the record carries no usable identifier
    fn record_id(&self) -> Option<&str>;
}

/// A catalog perfume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// PocketBase bookkeeping (`collectionId`, `created`, ...) passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An alternative offering comparable to a catalog perfume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equivalence {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub store: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    /// Display string, e.g. `"19,95 € – 29,95 €"`
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub buy_link: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub perfume_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<EquivalenceExpand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfume_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Relations PocketBase expanded on request (`expand=perfume_id`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceExpand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfume_id: Option<Product>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Product {
    fn record_id(&self) -> Option<&str> {
        non_empty(&self.id)
    }
}

impl Record for Equivalence {
    fn record_id(&self) -> Option<&str> {
        non_empty(&self.id)
    }
}

impl Equivalence {
    /// Title of the expanded parent product, if PocketBase expanded it
    pub fn parent_title(&self) -> Option<&str> {
        self.expand
            .as_ref()
            .and_then(|expand| expand.perfume_id.as_ref())
            .and_then(|parent| non_empty(&parent.title))
    }

    /// Denormalize the parent title, falling back to `placeholder`
    pub fn attach_parent_title(&mut self, placeholder: &str) {
        let title = self.parent_title().unwrap_or(placeholder).to_string();
        self.perfume_title = Some(title);
    }
}

/// Accept any JSON value for a text field: scalars are rendered, null and containers
/// become empty
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
