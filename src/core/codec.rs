//! Key casing and list-field encoding at the wire boundary
//!
//! The remote API speaks `snake_case` and stores list-valued fields
//! (`payments`, `previous`, `future`) as JSON text. Everything in this module
//! is total: no function here returns an error or panics on odd input.

use serde_json::Value;

/// Convert a wire key to its canonical (camelCase) form
///
/// Every underscore directly followed by a lowercase ASCII letter is dropped
/// and the letter is uppercased. Other underscores are kept, which is what
/// lets keys such as `a__b` survive a round trip through [`to_wire_key`].
///
/// # Examples
///
/// ```
/// use recordsync::core::codec::to_canonical_key;
///
/// assert_eq!(to_canonical_key("due_date"), "dueDate");
/// assert_eq!(to_canonical_key("products_supplied"), "productsSupplied");
/// assert_eq!(to_canonical_key("dueDate"), "dueDate");
/// ```
pub fn to_canonical_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(next) = chars.peek().copied() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

/// Convert a canonical key to its wire (snake_case) form
///
/// Each ASCII uppercase letter becomes `_` followed by its lowercase form;
/// the rest of the key is lowercased.
///
/// ```
/// use recordsync::core::codec::to_wire_key;
///
/// assert_eq!(to_wire_key("dueDate"), "due_date");
/// assert_eq!(to_wire_key("name"), "name");
/// ```
pub fn to_wire_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Decode a list-valued field into a sequence
///
/// - JSON text is parsed; unparseable text yields an empty sequence
/// - arrays are returned as-is
/// - any other truthy value (non-empty string payload, non-zero number,
///   `true`, object) is wrapped as a single element
/// - falsy values (`null`, `false`, `0`, `""`) yield an empty sequence
pub fn decode_list_field(value: &Value) -> Vec<Value> {
    let decoded = match value {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => parsed,
            Err(_) => return Vec::new(),
        },
        other => other.clone(),
    };

    match decoded {
        Value::Array(items) => items,
        other if is_truthy(&other) => vec![other],
        _ => Vec::new(),
    }
}

/// Encode a sequence as JSON text for transmission
///
/// Falls back to a comma-joined rendering of the elements if serialization
/// fails.
pub fn encode_list_field(items: &[Value]) -> String {
    match serde_json::to_string(items) {
        Ok(text) => text,
        Err(_) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// JavaScript-style truthiness of a JSON value
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
