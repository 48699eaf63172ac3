use indexmap::IndexSet;
use serde_json::Value;

use super::AiError;

/// Categories the classifier may return, in the order terms are collected
const CATEGORIES: &[(&str, Shape)] = &[
    ("keywords", Shape::List),
    ("primary_notes", Shape::List),
    ("secondary_notes", Shape::List),
    ("scent_family", Shape::Single),
    ("mood_or_occasion", Shape::Single),
    ("other_characteristics", Shape::List),
];

#[derive(Clone, Copy)]
enum Shape {
    List,
    Single,
}

/// Parse the raw completion text. The raw text travels with the error.
pub fn parse_analysis(raw: &str) -> Result<Value, AiError> {
    serde_json::from_str(raw).map_err(|source| AiError::Unparseable {
        raw: raw.to_string(),
        source,
    })
}

/// Flatten the categorized analysis into trimmed, non-empty, first-seen-unique terms.
///
/// Missing, mistyped or empty categories are skipped: the classifier is allowed to
/// leave out whatever does not apply.
pub fn search_terms(analysis: &Value) -> Vec<String> {
    let mut terms = IndexSet::new();

    for (key, shape) in CATEGORIES {
        let Some(value) = analysis.get(key) else {
            continue;
        };
        match shape {
            Shape::List => {
                let Some(items) = value.as_array() else {
                    continue;
                };
                for item in items.iter().filter_map(Value::as_str) {
                    insert_trimmed(&mut terms, item);
                }
            }
            Shape::Single => {
                if let Some(item) = value.as_str() {
                    insert_trimmed(&mut terms, item);
                }
            }
        }
    }

    terms.into_iter().collect()
}

fn insert_trimmed(terms: &mut IndexSet<String>, raw: &str) {
    let term = raw.trim();
    if !term.is_empty() {
        terms.insert(term.to_string());
    }
}
