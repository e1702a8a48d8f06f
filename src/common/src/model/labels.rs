//! Label name mapping between the query language and the log store.
//!
//! Query-side label names are safe identifiers (`service_name`); the store
//! keys its label map with dotted attribute names (`service.name`). The two
//! functions here convert between the forms. Both sides of a query must use
//! the same mapping: predicates are built against denormalized keys, and the
//! keys read back out of the store are normalized again before they are
//! compared or rendered, so a result stream always matches the selector that
//! produced it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Convert a query-side label name into the store's dotted key form.
pub fn denormalize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c == '_' { '.' } else { c })
        .collect()
}

/// Convert a store-side label key back into a safe query-side name.
///
/// Any character that is not alphanumeric or an underscore becomes an
/// underscore. A leading digit gets a `key_` prefix, a single leading
/// underscore a `key` prefix; a double underscore is left alone.
pub fn normalize_label(label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }

    let mut normalized: String = label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if normalized.starts_with(|c: char| c.is_ascii_digit()) {
        normalized.insert_str(0, "key_");
    } else if normalized.starts_with('_') && !normalized.starts_with("__") {
        normalized.insert_str(0, "key");
    }

    normalized
}

/// A normalized label set, ordered lexicographically by key.
///
/// The `Display` rendering is the canonical stream identity used for
/// hashing: `{key="value", key2="value2"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    /// Build a label set from raw store keys, normalizing every key.
    /// Values pass through unchanged.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self(
            raw.into_iter()
                .map(|(key, value)| (normalize_label(&key), value))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value:?}")?;
        }
        write!(f, "}}")
    }
}
