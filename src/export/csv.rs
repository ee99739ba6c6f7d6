//! CSV rendering of statements and record lists

use crate::core::record::Record;
use crate::export::statement::{InvoiceRow, StatementBody, StatementDocument};
use anyhow::{Context, Result};
use csv::{Terminator, Writer, WriterBuilder};

/// Column headers written by [`records_to_csv`]
pub const RECORD_HEADERS: [&str; 9] = [
    "Name",
    "Contact",
    "Phone",
    "Products",
    "Amount",
    "Paid",
    "Due",
    "State",
    "Due Date",
];

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Render a statement body as CSV
///
/// Generic statements get `Description,Amount` columns; invoice statements
/// use the invoice headers.
pub fn statement_to_csv(document: &StatementDocument) -> Result<String> {
    let mut out = writer();

    match &document.body {
        StatementBody::Generic(lines) => {
            out.write_record(["Description", "Amount"])?;
            for line in lines {
                out.write_record([line.label.clone(), format!("{:.2}", line.amount)])?;
            }
        }
        StatementBody::Invoice(rows) => {
            out.write_record(InvoiceRow::HEADERS)?;
            for row in rows {
                out.write_record(row.cells())?;
            }
        }
    }

    finish(out)
}

/// Render records as CSV, one row per record
pub fn records_to_csv<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<String> {
    let mut out = writer();
    out.write_record(RECORD_HEADERS)?;

    for record in records {
        out.write_record([
            record.name.clone(),
            record.contact.clone(),
            record.phone.clone(),
            record.products_supplied.display(),
            format!("{:.2}", record.amount),
            format!("{:.2}", record.total_paid()),
            format!("{:.2}", record.amount_due()),
            record.state.to_string(),
            record.due_date.clone().unwrap_or_default(),
        ])?;
    }

    finish(out)
}
