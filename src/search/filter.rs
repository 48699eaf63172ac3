//! Builds PocketBase filter expressions from search terms.
//!
//! Each term becomes a parenthesized group `(f1~"term" || f2~"term")` over the
//! configured fields. Groups are joined with `||` or `&&` and the whole expression is
//! wrapped once more. Quotes inside terms are doubled before interpolation.

use indexmap::IndexSet;
use serde::Deserialize;

/// How per-term groups combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermJoin {
    /// A record matching any term qualifies
    #[default]
    Any,
    /// A record must match every term
    All,
}

impl TermJoin {
    fn operator(self) -> &'static str {
        match self {
            TermJoin::Any => " || ",
            TermJoin::All => " && ",
        }
    }
}

pub fn escape_term(term: &str) -> String {
    term.replace('"', "\"\"")
}

/// `None` when there is nothing to match on; the caller must then skip the query.
pub fn build_term_filter<S>(terms: &[S], fields: &[String], join: TermJoin) -> Option<String>
where
    S: AsRef<str>,
{
    if terms.is_empty() || fields.is_empty() {
        return None;
    }

    let groups: Vec<String> = terms
        .iter()
        .map(|term| {
            let escaped = escape_term(term.as_ref());
            let matches: Vec<String> = fields
                .iter()
                .map(|field| format!("{field}~\"{escaped}\""))
                .collect();
            format!("({})", matches.join(" || "))
        })
        .collect();

    Some(format!("({})", groups.join(join.operator())))
}

/// Equality on a relation field for any of `ids`, e.g. `(perfume_id="a" || perfume_id="b")`
pub fn build_relation_filter<S>(field: &str, ids: &[S]) -> Option<String>
where
    S: AsRef<str>,
{
    if ids.is_empty() {
        return None;
    }

    let parts: Vec<String> = ids
        .iter()
        .map(|id| format!("{field}=\"{}\"", escape_term(id.as_ref())))
        .collect();
    Some(format!("({})", parts.join(" || ")))
}

/// Split a comma-separated list into trimmed, non-empty, first-seen-unique entries
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
