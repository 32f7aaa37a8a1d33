use datatable_engine::{
    connectors::{sample_records, RecordStore},
    engine::{nest_flat_row, Column, DefaultQueryExecutor, QueryExecutor},
    utils::types::{DataFormat, QueryRequest, QueryResponse, Record, SortOrder},
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Build an executor over the given records
fn executor_for(records: Vec<Record>) -> DefaultQueryExecutor {
    let store = RecordStore::from_records(records, "test").expect("Failed to build store");
    DefaultQueryExecutor::new(Arc::new(store))
}

/// `count` records with ids 1..=count and a company name cycling through three values
fn generated_records(count: i64) -> Vec<Record> {
    let companies = ["Acme", "Tech Solutions Inc", "Globex"];
    (1..=count)
        .map(|id| {
            serde_json::from_value(json!({
                "id": id,
                "name": format!("User {:02}", id),
                "email": format!("user{}@example.com", id),
                "address": {"city": if id % 2 == 0 { "Reno" } else { "Austin" }},
                "company": {"name": companies[(id % 3) as usize]}
            }))
            .unwrap()
        })
        .collect()
}

fn ids(response: &QueryResponse) -> Vec<i64> {
    response
        .data
        .iter()
        .map(|row| row["id"].as_i64().expect("row without id"))
        .collect()
}

#[test]
fn test_company_substring_filter() {
    let records: Vec<Record> = serde_json::from_value(json!([
        {"id": 1, "company": {"name": "Tech Solutions Inc"}},
        {"id": 2, "company": {"name": "Acme"}}
    ]))
    .unwrap();
    let executor = executor_for(records);

    let response = executor.execute(&QueryRequest::new().with_filters("company.name:tech"));

    assert_eq!(ids(&response), vec![1]);
    assert_eq!(response.total, 1);
}

#[test]
fn test_operator_and_range_filters_agree() {
    let executor = executor_for(generated_records(10));

    let by_ops = executor.execute(&QueryRequest::new().with_filters("id:>=3,id:<=5"));
    let by_range = executor.execute(&QueryRequest::new().with_filters("id:3..5"));

    assert_eq!(ids(&by_ops), vec![3, 4, 5]);
    assert_eq!(ids(&by_ops), ids(&by_range));
}

#[test]
fn test_flat_projection_scenario() {
    let records: Vec<Record> = serde_json::from_value(json!([
        {"id": 7, "address": {"city": "Reno"}}
    ]))
    .unwrap();
    let executor = executor_for(records);

    let response = executor.execute(
        &QueryRequest::new()
            .with_columns(&["id", "address.city"])
            .with_format(DataFormat::Flat),
    );

    assert_eq!(Value::Object(response.data[0].clone()), json!({"id": 7, "city": "Reno"}));
    assert_eq!(response.format, DataFormat::Flat);
}

#[test]
fn test_second_page_of_twenty_five() {
    let executor = executor_for(generated_records(25));

    let response = executor.execute(&QueryRequest::new().with_columns(&["id"]).with_page(2, 10));

    assert_eq!(ids(&response), (11..=20).collect::<Vec<i64>>());
    assert_eq!(response.total, 25);

    let pagination = response.pagination.expect("Expected pagination");
    assert_eq!(pagination.pages, 3);
    assert!(pagination.has_next);
    assert!(pagination.has_prev);
}

#[test]
fn test_unknown_sort_key_keeps_filtered_order() {
    let executor = executor_for(generated_records(12));
    let base = QueryRequest::new().with_filters("company.name:acme");

    let unsorted = executor.execute(&base);
    let sorted = executor.execute(&base.clone().with_sort("nonexistent_key", SortOrder::Desc));

    assert_eq!(ids(&unsorted), vec![3, 6, 9, 12]);
    assert_eq!(ids(&sorted), ids(&unsorted));
}

#[test]
fn test_filtering_is_idempotent() {
    let executor = executor_for(generated_records(20));
    let request = QueryRequest::new().with_filters("id:>4, company.name:o, email:example");

    let first = executor.execute(&request);
    let second = executor.execute(&request);

    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn test_pages_partition_the_result() {
    let executor = executor_for(generated_records(23));
    let limit = 4;

    let full = executor.execute(&QueryRequest::new().with_sort("city", SortOrder::Asc));
    let pages = full.total.div_ceil(limit);

    let mut concatenated = Vec::new();
    for page in 1..=pages {
        let response = executor.execute(
            &QueryRequest::new()
                .with_sort("city", SortOrder::Asc)
                .with_page(page as u32, limit as u32),
        );
        concatenated.extend(ids(&response));
    }

    assert_eq!(concatenated, ids(&full));
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let executor = executor_for(generated_records(10));

    let asc = executor.execute(&QueryRequest::new().with_sort("address.city", SortOrder::Asc));
    assert_eq!(ids(&asc), vec![1, 3, 5, 7, 9, 2, 4, 6, 8, 10]);

    let desc = executor.execute(&QueryRequest::new().with_sort("city", SortOrder::Desc));
    assert_eq!(ids(&desc), vec![2, 4, 6, 8, 10, 1, 3, 5, 7, 9]);
}

#[test]
fn test_sort_id_numerically() {
    let executor = executor_for(generated_records(12));

    let response = executor.execute(&QueryRequest::new().with_sort("id", SortOrder::Desc).with_page(1, 3));

    assert_eq!(ids(&response), vec![12, 11, 10]);
}

#[test]
fn test_missing_sort_values_sort_first() {
    let records: Vec<Record> = serde_json::from_value(json!([
        {"id": 1, "phone": "555-0100"},
        {"id": 2},
        {"id": 3, "phone": "111-0100"}
    ]))
    .unwrap();
    let executor = executor_for(records);

    let response = executor.execute(&QueryRequest::new().with_sort("phone", SortOrder::Asc));

    assert_eq!(ids(&response), vec![2, 3, 1]);
}

#[test]
fn test_search_then_filter_then_sort() {
    let executor = executor_for(sample_records());

    let response = executor.execute(
        &QueryRequest::new()
            .with_search("e-enable")
            .with_filters("id:<9")
            .with_sort("name", SortOrder::Asc)
            .with_columns(&["id", "name"]),
    );

    // bs is not searched, so "e-enable" finds nothing
    assert!(response.is_empty());

    let response = executor.execute(
        &QueryRequest::new()
            .with_search("group")
            .with_filters("id:<8")
            .with_columns(&["id", "company.name"]),
    );
    assert_eq!(ids(&response), vec![7]);
    assert_eq!(response.data[0]["company"], json!({"name": "Johns Group"}));
}

#[test]
fn test_nested_projection_only_contains_catalog_paths() {
    let executor = executor_for(sample_records());
    let requested = ["id", "address.geo.lat", "company.bs", "unknown.path", "website"];

    let response = executor.execute(&QueryRequest::new().with_columns(&requested));

    for row in &response.data {
        for (key, value) in row {
            match key.as_str() {
                "id" | "website" => assert!(!value.is_object()),
                "address" => {
                    let address = value.as_object().unwrap();
                    assert_eq!(address.keys().collect::<Vec<_>>(), vec!["geo"]);
                    assert!(address["geo"].get("lat").is_some());
                }
                "company" => {
                    assert_eq!(value.as_object().unwrap().keys().collect::<Vec<_>>(), vec!["bs"]);
                }
                other => panic!("Unexpected key {}", other),
            }
        }
    }
    assert_eq!(response.columns, requested.to_vec());
}

#[test]
fn test_flat_round_trip_matches_nested() {
    let executor = executor_for(sample_records());

    let flat = executor.execute(&QueryRequest::new().with_format(DataFormat::Flat));
    let nested = executor.execute(&QueryRequest::new());

    for (flat_row, nested_row) in flat.data.iter().zip(&nested.data) {
        assert_eq!(&nest_flat_row(flat_row), nested_row);
    }
    assert!(flat.data[0].keys().all(|k| Column::from_flat_key(k).is_some()));
}

#[test]
fn test_malformed_input_never_fails() {
    let executor = executor_for(sample_records());

    let response = executor.execute(
        &QueryRequest::new()
            .with_filters("garbage,,id:abc..5,:,name:")
            .with_sort("", SortOrder::Desc)
            .with_columns(&["", "nope"]),
    );

    // "id:abc..5" rejects every record; the rest are dropped or match everything
    assert_eq!(response.total, 0);
    assert_eq!(response.columns, vec!["", "nope"]);
}

#[test]
fn test_timestamp_filters_on_text_fields() {
    let records: Vec<Record> = serde_json::from_value(json!([
        {"id": 1, "website": "2024-01-10T00:00:00Z"},
        {"id": 2, "website": "2024-03-01T00:00:00Z"},
        {"id": 3, "website": "2024-02-01"}
    ]))
    .unwrap();
    let executor = executor_for(records);

    let response = executor.execute(
        &QueryRequest::new().with_filters("website:2024-01-01T00:00:00Z..2024-02-15T00:00:00Z"),
    );
    // the naive date never compares with offset-aware bounds
    assert_eq!(ids(&response), vec![1]);

    let response = executor.execute(&QueryRequest::new().with_filters("website:>2024-01-15"));
    assert_eq!(ids(&response), vec![3]);
}

#[test]
fn test_requested_columns_are_echoed_verbatim() {
    let executor = executor_for(sample_records());

    let response = executor.execute(
        &QueryRequest::new()
            .with_columns(&["id", "bogus", "id", "city"])
            .with_format(DataFormat::Flat)
            .with_page(1, 1),
    );

    assert_eq!(response.columns, vec!["id", "bogus", "id", "city"]);
    assert_eq!(Value::Object(response.data[0].clone()), json!({"id": 1, "city": "Gwenborough"}));
}
