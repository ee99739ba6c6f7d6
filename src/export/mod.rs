//! Document export for list views
//!
//! A [`StatementDocument`] describes what a printed statement contains; how
//! it becomes bytes is up to a [`DocumentRenderer`]. CSV rendering ships with
//! the crate.

pub mod csv;
pub mod statement;

pub use self::csv::{records_to_csv, statement_to_csv};
pub use statement::{
    DocumentRenderer, InvoiceRow, Palette, StatementBody, StatementDocument, StatementLine,
    StatusTone, file_name, filter_summary,
};
