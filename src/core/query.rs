//! Search, sort, paginate and aggregate record collections
//!
//! Every list view runs the same pipeline over a committed snapshot:
//!
//! ```text
//! records ──▶ filter(search) ──┬──▶ sort(key, dir) ──▶ paginate(page) ──▶ rows
//!                              └──▶ aggregate ─────────────────────────▶ totals
//! ```
//!
//! Totals are taken over the filtered set *before* pagination, so they cover
//! every matching record rather than only the visible page.
//!
//! # Example
//! ```rust,ignore
//! let view = TableView::suppliers();
//! let mut state = QueryState::default();
//! state.set_search_text("acme");
//! let result = view.run(&store.records(), &state);
//! println!("page {} of {}", result.page.page, result.page.total_pages);
//! ```

use crate::core::codec::to_canonical_key;
use crate::core::field::FieldValue;
use crate::core::record::Record;
use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// UI-held query state for one view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryState {
    /// Changed only through [`QueryState::set_search_text`], which keeps
    /// the page in step
    search_text: String,
    pub sort_key: String,
    pub sort_direction: SortDirection,
    /// Page number (starts at 1)
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort_key: "name".to_string(),
            sort_direction: SortDirection::Asc,
            page: 1,
        }
    }
}

impl QueryState {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Change the search text; a different text sends the view back to page 1
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.search_text {
            self.search_text = text;
            self.page = 1;
        }
    }

    /// Sort by `key`, flipping the direction when it is already the sort key
    pub fn toggle_sort(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.sort_key {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Asc;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, info: &PageInfo) {
        if info.has_next {
            self.page = info.page + 1;
        }
    }

    pub fn prev_page(&mut self, info: &PageInfo) {
        if info.has_prev {
            self.page = info.page - 1;
        }
    }
}

/// Anything the table pipeline can query
pub trait Tabular {
    /// Value of a field by canonical name, `Null` when absent
    fn field_value(&self, key: &str) -> FieldValue;

    /// Billed amount
    fn amount(&self) -> f64;

    /// Sum of received payments
    fn paid(&self) -> f64;
}

impl Tabular for Record {
    fn field_value(&self, key: &str) -> FieldValue {
        Record::field_value(self, key)
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn paid(&self) -> f64 {
        self.total_paid()
    }
}

/// Per-view configuration: page size and searchable fields
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub page_size: usize,
    pub searchable_fields: Vec<String>,
}

impl TableView {
    pub fn new<I, S>(page_size: usize, searchable_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            page_size,
            searchable_fields: searchable_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Supplier list: 8 per page, searchable by name, contact and phone
    pub fn suppliers() -> Self {
        Self::new(8, ["name", "contact", "phone"])
    }

    /// Debtor list: 5 per page, searchable by name
    pub fn debtors() -> Self {
        Self::new(5, ["name"])
    }

    /// Page size, at least 1
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    /// Run the full pipeline against a snapshot
    pub fn run<'a, T: Tabular>(
        &self,
        records: &'a [T],
        state: &QueryState,
    ) -> QueryResult<'a, T> {
        let filtered = filter_records(records, &self.searchable_fields, state.search_text());
        let totals = Totals::of(filtered.iter().copied());

        let sorted = sort_records(filtered, &state.sort_key, state.sort_direction);
        let page = PageInfo::new(state.page(), self.page_size(), sorted.len());
        let rows = sorted
            .iter()
            .skip(page.offset())
            .take(page.page_size)
            .copied()
            .collect();

        QueryResult {
            rows,
            matching: sorted,
            page,
            totals,
        }
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct QueryResult<'a, T> {
    /// Records on the current page, in sorted order
    pub rows: Vec<&'a T>,
    /// Every record matching the search, in sorted order
    pub matching: Vec<&'a T>,
    pub page: PageInfo,
    /// Totals over every record matching the search
    pub totals: Totals,
}

/// Aggregate totals over a filtered record set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_amount: f64,
    pub total_paid: f64,
    pub total_due: f64,
}

impl Totals {
    pub fn of<'a, T: Tabular + 'a>(records: impl IntoIterator<Item = &'a T>) -> Self {
        let (total_amount, total_paid) = records
            .into_iter()
            .fold((0.0, 0.0), |(amount, paid), r| (amount + r.amount(), paid + r.paid()));

        Self {
            total_amount,
            total_paid,
            total_due: total_amount - total_paid,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Current page number (starts at 1, clamped to the last page)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages, at least 1
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Index of the first row on this page
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// Keep records whose searchable fields contain `search` (case-insensitive)
pub fn filter_records<'a, T: Tabular>(
    records: &'a [T],
    fields: &[String],
    search: &str,
) -> Vec<&'a T> {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    let keys: Vec<String> = fields.iter().map(|f| to_canonical_key(f)).collect();
    records
        .iter()
        .filter(|r| {
            keys.iter().any(|key| {
                r.field_value(key)
                    .search_text()
                    .to_lowercase()
                    .contains(&needle)
            })
        })
        .collect()
}

/// Stable sort by one field
///
/// Accepts canonical or wire key names. Equal keys keep their input order in
/// both directions.
pub fn sort_records<'a, T: Tabular>(
    mut rows: Vec<&'a T>,
    sort_key: &str,
    direction: SortDirection,
) -> Vec<&'a T> {
    let key = to_canonical_key(sort_key);
    rows.sort_by(|a, b| {
        let ord = a.field_value(&key).compare(&b.field_value(&key));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    rows
}
