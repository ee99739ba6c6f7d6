//! Query engine behaviour over normalized records
//!
//! These tests verify that:
//! - Search, sort and pagination compose in that order
//! - Totals cover the whole filtered set, whatever the page or sort
//! - Sorting is stable in both directions

use recordsync::core::normalize::normalize_value;
use recordsync::prelude::*;
use serde_json::{Value, json};

fn records(raw: Value) -> Vec<Record> {
    raw.as_array()
        .unwrap()
        .iter()
        .filter_map(normalize_value)
        .collect()
}

fn bob_and_ann() -> Vec<Record> {
    records(json!([
        {"name": "Bob", "amount": 100, "payments": [{"amount": 100}]},
        {"name": "Ann", "amount": 500, "payments": [{"amount": 300}]},
    ]))
}

fn names<'a>(rows: &[&'a Record]) -> Vec<&'a str> {
    rows.iter().map(|r| r.name.as_str()).collect()
}

// =============================================================================
// Worked examples
// =============================================================================

#[test]
fn test_sort_by_name_with_totals() {
    let data = bob_and_ann();
    let state = QueryState::default();

    let result = TableView::new(10, ["name"]).run(&data, &state);

    assert_eq!(names(&result.rows), ["Ann", "Bob"]);
    assert_eq!(result.totals.total_amount, 600.0);
    assert_eq!(result.totals.total_paid, 400.0);
    assert_eq!(result.totals.total_due, 200.0);
}

#[test]
fn test_search_narrows_totals() {
    let data = bob_and_ann();
    let mut state = QueryState::default();
    state.set_search_text("bo");

    let result = TableView::new(10, ["name"]).run(&data, &state);

    assert_eq!(names(&result.rows), ["Bob"]);
    assert_eq!(result.totals.total_amount, 100.0);
    assert_eq!(result.totals.total_due, 0.0);
}

#[test]
fn test_second_page_of_one() {
    let data = bob_and_ann();
    let mut state = QueryState::default();
    state.set_page(2);

    let result = TableView::new(1, ["name"]).run(&data, &state);

    assert_eq!(names(&result.rows), ["Bob"]);
    assert_eq!(result.page.total_pages, 2);
    assert!(result.page.has_prev);
    assert!(!result.page.has_next);
}

// =============================================================================
// Invariants
// =============================================================================

#[test]
fn test_totals_ignore_page_and_sort() {
    let data = records(json!([
        {"name": "Acme", "amount": "120.50", "payments": "[{\"amount\": 20}]"},
        {"name": "Brake World", "amount": 80},
        {"name": "Acme Tyres", "amount": 300, "payments": [{"amount": 50}, {"amount": 25}]},
        {"name": "Delta", "amount": 10},
    ]));
    let view = TableView::new(2, ["name"]);

    let mut baseline_state = QueryState::default();
    baseline_state.set_search_text("acme");
    let baseline = view.run(&data, &baseline_state).totals;
    assert_eq!(baseline.total_amount, 420.5);
    assert_eq!(baseline.total_paid, 95.0);

    for key in ["name", "amount", "amountDue", "due_date"] {
        for page in 1..=3 {
            let mut state = baseline_state.clone();
            state.sort_key = key.to_string();
            state.set_page(page);
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                state.sort_direction = direction;
                assert_eq!(view.run(&data, &state).totals, baseline);
            }
        }
    }
}

#[test]
fn test_sort_is_stable_both_directions() {
    let data = records(json!([
        {"name": "p", "amount": 5},
        {"name": "q", "amount": 1},
        {"name": "r", "amount": 5},
        {"name": "s", "amount": 5},
    ]));
    let view = TableView::new(10, ["name"]);

    let mut state = QueryState::default();
    state.toggle_sort("amount");
    assert_eq!(names(&view.run(&data, &state).rows), ["q", "p", "r", "s"]);

    state.toggle_sort("amount");
    assert_eq!(state.sort_direction, SortDirection::Desc);
    assert_eq!(names(&view.run(&data, &state).rows), ["p", "r", "s", "q"]);
}

#[test]
fn test_empty_input() {
    let data: Vec<Record> = Vec::new();
    let mut state = QueryState::default();
    state.set_page(4);

    let result = TableView::debtors().run(&data, &state);

    assert!(result.rows.is_empty());
    assert_eq!(result.page.total_pages, 1);
    assert_eq!(result.page.page, 1);
    assert_eq!(result.totals, Totals::default());
}

#[test]
fn test_no_match_gives_zero_totals() {
    let data = bob_and_ann();
    let mut state = QueryState::default();
    state.set_search_text("zzz");

    let result = TableView::suppliers().run(&data, &state);
    assert!(result.rows.is_empty());
    assert_eq!(result.totals.total_amount, 0.0);
    assert_eq!(result.page.total_pages, 1);
}

#[test]
fn test_page_sizes_per_view() {
    let data: Vec<Record> = (0..11)
        .map(|i| Record::new(format!("R{:02}", i), 1.0))
        .collect();
    let state = QueryState::default();

    let suppliers = TableView::suppliers().run(&data, &state);
    assert_eq!(suppliers.rows.len(), 8);
    assert_eq!(suppliers.page.total_pages, 2);

    let debtors = TableView::debtors().run(&data, &state);
    assert_eq!(debtors.rows.len(), 5);
    assert_eq!(debtors.page.total_pages, 3);
}

#[test]
fn test_supplier_search_covers_contact_and_phone() {
    let data = records(json!([
        {"name": "Acme", "contact": "Wanjiku", "phone": "0722 100 200"},
        {"name": "Brake World", "contact": "Otieno", "phone": "0733 555 000"},
    ]));

    let mut state = QueryState::default();
    state.set_search_text("otie");
    let result = TableView::suppliers().run(&data, &state);
    assert_eq!(names(&result.rows), ["Brake World"]);

    state.set_search_text("0722");
    let result = TableView::suppliers().run(&data, &state);
    assert_eq!(names(&result.rows), ["Acme"]);

    let result = TableView::debtors().run(&data, &state);
    assert!(result.rows.is_empty());
}

#[test]
fn test_view_from_config() {
    let config = ClientConfig::default_config();
    let view = config.view("suppliers").unwrap().table_view();
    assert_eq!(view, TableView::suppliers());
}
