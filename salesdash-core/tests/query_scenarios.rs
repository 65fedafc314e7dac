//! End-to-end query scenarios through the facade
//!
//! These tests drive the public facade the way the HTTP layer does:
//! load raw rows, then page, filter and aggregate, checking the documented
//! coercion and edge-case policies.

use std::sync::Arc;

use salesdash_core::{DatasetStore, FilterCriteria, QueryFacade, RawRow, SalesdashError};

fn raw(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn facade(rows: &[RawRow]) -> QueryFacade {
    let store = Arc::new(DatasetStore::new());
    store.load(rows);
    QueryFacade::new(store)
}

#[test]
fn three_uniform_rows_produce_expected_kpis_and_monthly_series() {
    let facade = facade(&[
        raw(&[("Date", "05/01/2023"), ("Total", "10"), ("Quantity", "1")]),
        raw(&[("Date", "05/01/2023"), ("Total", "20"), ("Quantity", "2")]),
        raw(&[("Date", "05/01/2023"), ("Total", "30"), ("Quantity", "3")]),
    ]);

    let stats = facade.get_full_stats().unwrap();
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.total_sales, 60.0);
    assert_eq!(stats.total_quantity, 6);
    assert_eq!(stats.avg_order_value, 20.0);

    assert_eq!(stats.monthly_sales.len(), 1);
    assert_eq!(stats.monthly_sales[0].month, "2023-01");
    assert_eq!(stats.monthly_sales[0].total, 60.0);
}

#[test]
fn unparsable_total_counts_as_a_record_but_not_as_sales() {
    let facade = facade(&[
        raw(&[("Date", "05/01/2023"), ("Total", "10"), ("Quantity", "1")]),
        raw(&[("Date", "06/01/2023"), ("Total", "abc"), ("Quantity", "2")]),
    ]);

    let stats = facade.get_full_stats().unwrap();
    assert_eq!(stats.total_records, 2);
    assert_eq!(stats.total_sales, 10.0);
    // The coerced zero is visible in the page output too
    let page = facade.get_page(1, 1).unwrap();
    assert_eq!(page[0]["Total"], serde_json::json!(0.0));
}

#[test]
fn total_sales_equals_the_sum_of_coerced_totals() {
    let rows: Vec<RawRow> = (0..50)
        .map(|i| {
            raw(&[
                ("Date", "05/01/2023"),
                ("Total", if i % 7 == 0 { "oops" } else { "2.5" }),
                ("Quantity", "1"),
            ])
        })
        .collect();
    let expected: f64 = (0..50).map(|i| if i % 7 == 0 { 0.0 } else { 2.5 }).sum();

    let facade = facade(&rows);
    let stats = facade.get_full_stats().unwrap();
    assert_eq!(stats.total_sales, expected);
    assert_eq!(
        stats.avg_order_value,
        stats.total_sales / stats.total_records as f64
    );
}

#[test]
fn all_sentinel_criteria_match_the_unfiltered_page() {
    let facade = facade(&[
        raw(&[("Total", "10"), ("Status", "Paid"), ("State", "California")]),
        raw(&[("Total", "20"), ("Status", "Pending"), ("State", "Texas")]),
        raw(&[("Total", "30"), ("Status", "Paid"), ("State", "Nevada")]),
    ]);

    let mut criteria = FilterCriteria::default();
    criteria.status = Some("All".to_string());
    criteria.state = Some("All".to_string());
    criteria.payment_method = Some("All".to_string());

    let unfiltered = facade.get_page(0, 100).unwrap();
    let filtered = facade.get_filtered_page(&criteria, 0, 100).unwrap();
    assert_eq!(unfiltered, filtered);
}

#[test]
fn filtered_stats_for_one_matching_state() {
    let facade = facade(&[
        raw(&[("Total", "50"), ("Quantity", "5"), ("State", "California"), ("Status", "Paid")]),
        raw(&[("Total", "99"), ("Quantity", "9"), ("State", "Texas"), ("Status", "Paid")]),
    ]);

    let mut criteria = FilterCriteria::default();
    criteria.state = Some("California".to_string());

    let stats = facade.get_filtered_stats(&criteria).unwrap();
    assert_eq!(stats.total_count, 1);
    assert_eq!(stats.total_sales, 50.0);
    assert_eq!(stats.avg_order_value, 50.0);
}

#[test]
fn unparsable_date_bound_yields_empty_results() {
    let facade = facade(&[
        raw(&[("Date", "05/01/2023"), ("Total", "10")]),
        raw(&[("Date", "06/01/2023"), ("Total", "20")]),
    ]);

    let mut criteria = FilterCriteria::default();
    criteria.from_date = Some("not-a-date".to_string());

    let page = facade.get_filtered_page(&criteria, 0, 100).unwrap();
    assert!(page.is_empty());
    let stats = facade.get_filtered_stats(&criteria).unwrap();
    assert_eq!(stats.total_count, 0);
    assert_eq!(stats.avg_order_value, 0.0);
}

#[test]
fn date_bounds_in_the_input_format_include_their_endpoints() {
    let facade = facade(&[
        raw(&[("Date", "05/01/2023"), ("Total", "10")]),
        raw(&[("Date", "15/01/2023"), ("Total", "20")]),
        raw(&[("Date", "25/01/2023"), ("Total", "30")]),
    ]);

    let mut criteria = FilterCriteria::default();
    criteria.from_date = Some("05/01/2023".to_string());
    criteria.to_date = Some("15/01/2023".to_string());

    let stats = facade.get_filtered_stats(&criteria).unwrap();
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.total_sales, 30.0);
}

#[test]
fn add_column_succeeds_once_then_rejects_the_duplicate() {
    let facade = facade(&[raw(&[("Total", "10")]), raw(&[("Total", "20")])]);
    let before = facade.get_columns().len();

    facade.add_column("Notes", "").unwrap();
    assert_eq!(facade.get_columns().len(), before + 1);

    let err = facade.add_column("Notes", "y").unwrap_err();
    assert!(matches!(err, SalesdashError::DuplicateColumn(_)));
    assert_eq!(err.to_string(), "Column 'Notes' already exists");
    assert_eq!(facade.get_columns().len(), before + 1);

    // Every row carries the default for the added column
    let page = facade.get_page(0, 100).unwrap();
    assert!(page.iter().all(|row| row["Notes"] == ""));
}

#[test]
fn filter_options_exclude_empty_values_and_keep_first_seen_order() {
    let facade = facade(&[
        raw(&[("Status", "Paid")]),
        raw(&[("Status", "Pending")]),
        raw(&[("Status", "")]),
        raw(&[("Status", "Paid")]),
    ]);

    let options = facade.get_filter_options();
    assert_eq!(
        options["Status"],
        serde_json::json!(["All", "Paid", "Pending"])
    );
}

#[test]
fn stats_on_an_empty_store_are_zeroed_not_errors() {
    let store = Arc::new(DatasetStore::new());
    let facade = QueryFacade::new(store);

    let stats = facade.get_full_stats().unwrap();
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.total_sales, 0.0);
    assert_eq!(stats.avg_order_value, 0.0);
    assert!(stats.monthly_sales.is_empty());
    assert!(stats.top_skus.is_empty());
    assert!(facade.get_page(0, 100).unwrap().is_empty());
    assert!(facade.get_filter_options().is_empty());
}

#[test]
fn reload_discards_runtime_columns() {
    let store = Arc::new(DatasetStore::new());
    store.load(&[raw(&[("Total", "10")])]);
    let facade = QueryFacade::new(store.clone());

    facade.add_column("Notes", "x").unwrap();
    assert!(facade.get_columns().contains(&"Notes".to_string()));

    store.load(&[raw(&[("Total", "20")])]);
    assert!(!facade.get_columns().contains(&"Notes".to_string()));
}
