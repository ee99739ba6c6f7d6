//! Field values used for sorting and searching records

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A dynamically-typed field value read off a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Render the value for substring search
    pub fn search_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Null => String::new(),
        }
    }

    /// Total ordering used by the table sort
    ///
    /// `Null` compares as `0` against numbers and as `""` against text.
    /// Mixed text/number pairs compare by their text rendering.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, FieldValue::Number(b)) => 0f64.total_cmp(b),
            (FieldValue::Number(a), FieldValue::Null) => a.total_cmp(&0f64),
            (FieldValue::Null, FieldValue::Text(b)) => "".cmp(b.as_str()),
            (FieldValue::Text(a), FieldValue::Null) => a.as_str().cmp(""),
            (a, b) => a.search_text().cmp(&b.search_text()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
