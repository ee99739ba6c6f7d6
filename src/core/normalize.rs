//! Wire record ⇄ canonical record projection
//!
//! `normalize` never fails: the server response shape is not guaranteed, so
//! malformed fields degrade one by one to safe defaults.

use crate::core::codec::{decode_list_field, encode_list_field, to_canonical_key, to_wire_key};
use crate::core::record::{
    LedgerEntry, ProductsSupplied, Record, RecordId, RecordState, coerce_number,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A record as exchanged with the remote API (snake_case keys)
pub type WireRecord = IndexMap<String, Value>;

/// Canonical keys whose values travel as JSON text on the wire
pub const LIST_FIELDS: &[&str] = &["payments", "previous", "future"];

/// Wire keys that are JSON-encoded when sequence-valued
const WIRE_LIST_FIELDS: &[&str] = &["payments", "previous", "future", "products_supplied"];

/// (canonical key, wire alias) pairs adopted when the canonical key is absent
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("dueDate", "due_date"),
    ("productsSupplied", "products_supplied"),
];

const KNOWN_FIELDS: &[&str] = &[
    "id",
    "name",
    "contact",
    "email",
    "phone",
    "amount",
    "state",
    "dueDate",
    "productsSupplied",
    "previous",
    "future",
    "payments",
];

/// Turn one raw server record into a canonical [`Record`]
pub fn normalize(raw: &Map<String, Value>) -> Record {
    let mut fields: IndexMap<String, Value> = IndexMap::with_capacity(raw.len());
    for (key, value) in raw {
        fields.insert(to_canonical_key(key), value.clone());
    }

    for (canonical, alias) in FIELD_ALIASES {
        if !fields.contains_key(*canonical) {
            if let Some(value) = raw.get(*alias) {
                fields.insert((*canonical).to_string(), value.clone());
            }
        }
    }

    let entries = |key: &str| -> Vec<LedgerEntry> {
        let decoded = fields.get(key).map(decode_list_field).unwrap_or_default();
        decoded.iter().filter_map(LedgerEntry::from_value).collect()
    };

    let record = Record {
        id: fields.get("id").and_then(RecordId::from_value),
        name: text_field(fields.get("name")),
        contact: text_field(fields.get("contact")),
        email: text_field(fields.get("email")),
        phone: text_field(fields.get("phone")),
        amount: coerce_number(fields.get("amount")).max(0.0),
        state: match fields.get("state") {
            Some(Value::String(s)) if !s.is_empty() => RecordState::from(s.as_str()),
            _ => RecordState::default(),
        },
        due_date: match fields.get("dueDate") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        },
        products_supplied: fields
            .get("productsSupplied")
            .map(ProductsSupplied::from_value)
            .unwrap_or_default(),
        previous: entries("previous"),
        future: entries("future"),
        payments: entries("payments"),
        extra: IndexMap::new(),
    };

    let extra = fields
        .into_iter()
        .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
        .collect();

    Record { extra, ..record }
}

/// Normalize any JSON value; non-objects yield `None`
pub fn normalize_value(raw: &Value) -> Option<Record> {
    raw.as_object().map(normalize)
}

/// Prepare a canonical record for transmission
pub fn denormalize(record: &Record) -> WireRecord {
    denormalize_patch(&RecordPatch::from(record))
}

/// Prepare a partial record for transmission
///
/// Keys are rewritten to wire casing; sequence values of known list fields
/// become JSON text. Everything else passes through unchanged.
pub fn denormalize_patch(patch: &RecordPatch) -> WireRecord {
    let mut out = WireRecord::with_capacity(patch.fields.len());

    for (key, value) in &patch.fields {
        let wire_key = to_wire_key(key);
        let value = match value {
            Value::Array(items) if WIRE_LIST_FIELDS.contains(&wire_key.as_str()) => {
                Value::String(encode_list_field(items))
            }
            other => other.clone(),
        };
        out.insert(wire_key, value);
    }

    out
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Partial record used for create and update payloads
///
/// Keys are canonical (camelCase); order of insertion is kept.
///
/// ```
/// use recordsync::core::normalize::{RecordPatch, denormalize_patch};
///
/// let patch = RecordPatch::new().name("Acme Parts").amount(250.0).due_date("2025-09-01");
/// let wire = denormalize_patch(&patch);
/// assert_eq!(wire["due_date"], "2025-09-01");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    fields: IndexMap<String, Value>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set any canonical field
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.set("name", name.into())
    }

    pub fn contact(self, contact: impl Into<String>) -> Self {
        self.set("contact", contact.into())
    }

    pub fn email(self, email: impl Into<String>) -> Self {
        self.set("email", email.into())
    }

    pub fn phone(self, phone: impl Into<String>) -> Self {
        self.set("phone", phone.into())
    }

    pub fn amount(self, amount: f64) -> Self {
        self.set("amount", amount)
    }

    pub fn state(self, state: RecordState) -> Self {
        self.set("state", String::from(state))
    }

    pub fn due_date(self, date: impl Into<String>) -> Self {
        self.set("dueDate", date.into())
    }

    pub fn clear_due_date(self) -> Self {
        self.set("dueDate", Value::Null)
    }

    pub fn products_supplied(self, products: ProductsSupplied) -> Self {
        let value = match products {
            ProductsSupplied::Text(s) => Value::String(s),
            ProductsSupplied::List(items) => Value::from(items),
        };
        self.set("productsSupplied", value)
    }

    pub fn payments(self, entries: &[LedgerEntry]) -> Self {
        self.set("payments", entries_value(entries))
    }

    pub fn previous(self, entries: &[LedgerEntry]) -> Self {
        self.set("previous", entries_value(entries))
    }

    pub fn future(self, entries: &[LedgerEntry]) -> Self {
        self.set("future", entries_value(entries))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

fn entries_value(entries: &[LedgerEntry]) -> Value {
    Value::Array(entries.iter().map(LedgerEntry::to_value).collect())
}

impl From<&Record> for RecordPatch {
    fn from(record: &Record) -> Self {
        let mut patch = RecordPatch::new();
        if let Some(id) = &record.id {
            patch = patch.set("id", id.to_value());
        }
        let patch = patch
            .name(record.name.clone())
            .contact(record.contact.clone())
            .email(record.email.clone())
            .phone(record.phone.clone())
            .amount(record.amount)
            .state(record.state.clone());
        let patch = match &record.due_date {
            Some(date) => patch.due_date(date.clone()),
            None => patch.clear_due_date(),
        };
        let mut patch = patch
            .products_supplied(record.products_supplied.clone())
            .previous(&record.previous)
            .future(&record.future)
            .payments(&record.payments);

        for (key, value) in &record.extra {
            patch.fields.insert(key.clone(), value.clone());
        }
        patch
    }
}
