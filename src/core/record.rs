//! Canonical in-memory record types
//!
//! A [`Record`] is what the rest of the crate works with once a wire record
//! has gone through [`normalize`](crate::core::normalize::normalize). Its
//! field set is fixed: list fields are always sequences and `amount` is
//! always a finite, non-negative number.

use crate::core::field::FieldValue;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier assigned by the remote authority
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Read an id from a JSON value; anything but an integer or a
    /// non-empty string yields `None`
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(i) => Value::from(*i),
            RecordId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

/// Manually-set billing status of a record
///
/// This is stored as entered and is never derived from the payments, so it
/// may disagree with [`Record::amount_due`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum RecordState {
    #[default]
    Due,
    Overdue,
    Paid,
    Other(String),
}

impl RecordState {
    pub fn as_str(&self) -> &str {
        match self {
            RecordState::Due => "due",
            RecordState::Overdue => "overdue",
            RecordState::Paid => "paid",
            RecordState::Other(s) => s,
        }
    }
}

impl From<String> for RecordState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "due" => RecordState::Due,
            "overdue" => RecordState::Overdue,
            "paid" => RecordState::Paid,
            _ => RecordState::Other(value),
        }
    }
}

impl From<&str> for RecordState {
    fn from(value: &str) -> Self {
        RecordState::from(value.to_string())
    }
}

impl From<RecordState> for String {
    fn from(value: RecordState) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text or itemised list of supplied products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductsSupplied {
    Text(String),
    List(Vec<String>),
}

impl ProductsSupplied {
    /// Best-effort read from a JSON value
    ///
    /// Text holding a JSON array is decoded into a list; other text is kept
    /// verbatim.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => ProductsSupplied::List(items.iter().map(item_text).collect()),
            Value::String(s) => match serde_json::from_str::<Vec<Value>>(s) {
                Ok(items) => ProductsSupplied::List(items.iter().map(item_text).collect()),
                Err(_) => ProductsSupplied::Text(s.clone()),
            },
            Value::Null => ProductsSupplied::default(),
            other => ProductsSupplied::Text(other.to_string()),
        }
    }

    /// Display form (list items joined with `, `)
    pub fn display(&self) -> String {
        match self {
            ProductsSupplied::Text(s) => s.clone(),
            ProductsSupplied::List(items) => items.join(", "),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ProductsSupplied::Text(s) => s.is_empty(),
            ProductsSupplied::List(items) => items.is_empty(),
        }
    }
}

impl Default for ProductsSupplied {
    fn default() -> Self {
        ProductsSupplied::Text(String::new())
    }
}

fn item_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One dated amount in a record's `previous`, `future` or `payments` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: Option<String>,
    pub amount: f64,
}

impl LedgerEntry {
    pub fn new(date: impl Into<String>, amount: f64) -> Self {
        Self {
            date: Some(date.into()),
            amount,
        }
    }

    /// Best-effort read from a decoded list element
    ///
    /// Objects contribute their `date` and `amount`; bare numbers (or numeric
    /// strings) become an undated amount. Anything else is skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(Self {
                date: obj.get("date").and_then(date_text),
                amount: coerce_number(obj.get("amount")),
            }),
            Value::Number(_) | Value::String(_) => {
                let amount = parse_number(value)?;
                Some(Self { date: None, amount })
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "date": self.date,
            "amount": self.amount,
        })
    }
}

fn date_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Parse a JSON number or numeric string into a finite `f64`
pub(crate) fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Some(0.0);
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce an optional JSON value to a finite number, `0` on failure
pub(crate) fn coerce_number(value: Option<&Value>) -> f64 {
    value.and_then(parse_number).unwrap_or(0.0)
}

/// Canonical supplier/debtor record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub id: Option<RecordId>,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub amount: f64,
    pub state: RecordState,
    pub due_date: Option<String>,
    pub products_supplied: ProductsSupplied,
    pub previous: Vec<LedgerEntry>,
    pub future: Vec<LedgerEntry>,
    pub payments: Vec<LedgerEntry>,
    /// Fields the server sent that this type does not model
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Record {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            ..Self::default()
        }
    }

    /// Sum of all received payments
    pub fn total_paid(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// `amount` minus everything paid so far
    pub fn amount_due(&self) -> f64 {
        self.amount - self.total_paid()
    }

    /// Parse `dueDate` as an ISO date
    pub fn due_date_parsed(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok())
    }

    /// True when a balance is outstanding and the due date is before `today`
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.amount_due() > 0.0 && self.due_date_parsed().is_some_and(|d| d < today)
    }

    /// Look up a field by canonical name
    ///
    /// Derived keys `amountDue` and `totalPaid` are also accepted. Unknown
    /// keys fall back to `extra`, then to `Null`.
    pub fn field_value(&self, key: &str) -> FieldValue {
        match key {
            "id" => match &self.id {
                Some(RecordId::Int(i)) => FieldValue::Number(*i as f64),
                Some(RecordId::Text(s)) => FieldValue::Text(s.clone()),
                None => FieldValue::Null,
            },
            "name" => FieldValue::from(self.name.as_str()),
            "contact" => FieldValue::from(self.contact.as_str()),
            "email" => FieldValue::from(self.email.as_str()),
            "phone" => FieldValue::from(self.phone.as_str()),
            "amount" => FieldValue::Number(self.amount),
            "amountDue" => FieldValue::Number(self.amount_due()),
            "totalPaid" => FieldValue::Number(self.total_paid()),
            "state" => FieldValue::from(self.state.as_str()),
            "dueDate" => FieldValue::from(self.due_date.clone()),
            "productsSupplied" => FieldValue::Text(self.products_supplied.display()),
            other => match self.extra.get(other) {
                Some(Value::String(s)) => FieldValue::Text(s.clone()),
                Some(Value::Number(n)) => n
                    .as_f64()
                    .map(FieldValue::Number)
                    .unwrap_or(FieldValue::Null),
                Some(Value::Bool(b)) => FieldValue::Text(b.to_string()),
                _ => FieldValue::Null,
            },
        }
    }
}
