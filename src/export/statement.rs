//! Printable statement model

use crate::core::query::{QueryResult, Totals};
use crate::core::record::Record;
use chrono::NaiveDate;
use serde::Serialize;

/// One line of a generic statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    pub label: String,
    pub amount: f64,
}

impl StatementLine {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}

/// One row of an invoice-style statement
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRow {
    pub date: String,
    pub customer: String,
    pub invoice: String,
    pub vehicle: String,
    pub service: String,
    pub amount: f64,
    pub status: String,
    pub due_date: String,
}

impl InvoiceRow {
    /// Column headers, in display order
    pub const HEADERS: [&'static str; 8] = [
        "Date",
        "Customer",
        "Invoice #",
        "Vehicle",
        "Service",
        "Amount",
        "Status",
        "Due Date",
    ];

    /// Cells in the order of [`InvoiceRow::HEADERS`]
    pub fn cells(&self) -> [String; 8] {
        [
            self.date.clone(),
            self.customer.clone(),
            self.invoice.clone(),
            self.vehicle.clone(),
            self.service.clone(),
            format!("{:.2}", self.amount),
            self.status.clone(),
            self.due_date.clone(),
        ]
    }

    pub fn tone(&self) -> StatusTone {
        StatusTone::of(&self.status)
    }
}

impl From<&Record> for InvoiceRow {
    fn from(record: &Record) -> Self {
        let text = |key: &str| match record.extra.get(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Self {
            date: text("date"),
            customer: record.name.clone(),
            invoice: record
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            vehicle: text("vehicle"),
            service: record.products_supplied.display(),
            amount: record.amount,
            status: record.state.to_string(),
            due_date: record.due_date.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum StatementBody {
    /// Description/amount pairs
    Generic(Vec<StatementLine>),
    /// One row per record
    Invoice(Vec<InvoiceRow>),
}

/// Everything a rendered statement shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementDocument {
    pub title: String,
    /// `Key: value` pairs of the active filters, empty when none apply
    pub filter_summary: String,
    pub body: StatementBody,
    /// Totals of the underlying record set, for invoice statements
    pub totals: Option<Totals>,
}

impl StatementDocument {
    /// A description/amount statement
    pub fn generic(
        title: impl Into<String>,
        filters: &[(&str, &str)],
        lines: Vec<StatementLine>,
    ) -> Self {
        Self {
            title: title.into(),
            filter_summary: filter_summary(filters),
            body: StatementBody::Generic(lines),
            totals: None,
        }
    }

    /// An invoice statement of every record matching a query, in the
    /// query's sort order and regardless of the page it is showing
    pub fn from_query(
        title: impl Into<String>,
        filters: &[(&str, &str)],
        result: &QueryResult<'_, Record>,
    ) -> Self {
        Self {
            title: title.into(),
            filter_summary: filter_summary(filters),
            body: StatementBody::Invoice(
                result
                    .matching
                    .iter()
                    .map(|r| InvoiceRow::from(*r))
                    .collect(),
            ),
            totals: Some(result.totals),
        }
    }

    /// Sum of the line amounts, or of the row amounts for an invoice statement
    pub fn total(&self) -> f64 {
        match &self.body {
            StatementBody::Generic(lines) => lines.iter().map(|l| l.amount).sum(),
            StatementBody::Invoice(rows) => rows.iter().map(|r| r.amount).sum(),
        }
    }

    /// Closing line printed under the table
    pub fn totals_line(&self) -> String {
        match (&self.body, &self.totals) {
            (StatementBody::Invoice(_), Some(t)) => format!(
                "Total: {:.2}   Paid: {:.2}   Due: {:.2}",
                t.total_amount, t.total_paid, t.total_due
            ),
            _ => format!("Total: {:.2}", self.total()),
        }
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        file_name(&self.title, date)
    }
}

/// `Key: value` pairs joined by three spaces
///
/// Keys get a capitalised first letter; empty values and `all` are skipped.
pub fn filter_summary(filters: &[(&str, &str)]) -> String {
    filters
        .iter()
        .filter(|(_, v)| !v.is_empty() && *v != "all")
        .map(|(k, v)| {
            let mut chars = k.chars();
            let key: String = match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            };
            format!("{}: {}", key, v)
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// `Title_With_Underscores_YYYY-MM-DD.pdf`
pub fn file_name(title: &str, date: NaiveDate) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(c);
            in_space = false;
        }
    }
    format!("{}_{}.pdf", stem, date.format("%Y-%m-%d"))
}

/// Colour class of an invoice status cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Muted,
    Accent,
}

impl StatusTone {
    /// Case-insensitive substring match; `overdue` wins over `due`
    pub fn of(status: &str) -> Self {
        let status = status.to_lowercase();
        if status.is_empty() {
            StatusTone::Muted
        } else if status.contains("overdue") || status.contains("error") {
            StatusTone::Error
        } else if status.contains("paid") {
            StatusTone::Success
        } else if status.contains("due") {
            StatusTone::Warning
        } else {
            StatusTone::Accent
        }
    }

    pub fn color(self, palette: &Palette) -> &'static str {
        match self {
            StatusTone::Success => palette.success,
            StatusTone::Warning => palette.warning,
            StatusTone::Error => palette.error,
            StatusTone::Muted => palette.text_secondary,
            StatusTone::Accent => palette.primary,
        }
    }
}

/// Hex colours used by statement renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub border: &'static str,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#DC2626",
            secondary: "#1F2937",
            background: "#F9FAFB",
            surface: "#FFFFFF",
            text_primary: "#111827",
            text_secondary: "#6B7280",
            success: "#10B981",
            warning: "#F59E0B",
            error: "#EF4444",
            border: "#E5E7EB",
        }
    }
}

/// Turns a statement into a file (PDF, spreadsheet, ...)
pub trait DocumentRenderer: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, document: &StatementDocument) -> anyhow::Result<Vec<u8>>;
}
