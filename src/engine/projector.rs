use serde_json::{Map, Value};

use crate::engine::column_catalog::{Column, ColumnGroup};
use crate::engine::field_resolver::{resolve_column, FieldValue};
use crate::utils::types::{DataFormat, Record, Row};

/// Reshape records into output rows. `None` selects every column.
pub fn project(records: &[&Record], columns: Option<&[Column]>, format: DataFormat) -> Vec<Row> {
    records
        .iter()
        .map(|record| project_record(record, columns, format))
        .collect()
}

/// Reshape a single record
pub fn project_record(record: &Record, columns: Option<&[Column]>, format: DataFormat) -> Row {
    match (columns, format) {
        (None, DataFormat::Nested) => full_nested(record),
        (None, DataFormat::Flat) => full_flat(record),
        (Some(columns), DataFormat::Nested) => nested_subset(record, columns),
        (Some(columns), DataFormat::Flat) => flat_subset(record, columns),
    }
}

fn full_nested(record: &Record) -> Row {
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => row,
        _ => Row::new(),
    }
}

/// Every catalog column that resolves, under its flat key
fn full_flat(record: &Record) -> Row {
    Column::ALL
        .into_iter()
        .filter_map(|column| {
            resolve_column(record, column).map(|value| (column.flat_key().to_string(), value.to_json()))
        })
        .collect()
}

fn flat_subset(record: &Record, columns: &[Column]) -> Row {
    let mut row = Row::new();
    for column in columns {
        if let Some(value) = non_empty(record, *column) {
            row.insert(column.flat_key().to_string(), value.to_json());
        }
    }
    row
}

fn nested_subset(record: &Record, columns: &[Column]) -> Row {
    let mut row = Row::new();

    for column in columns {
        let value = match column.group() {
            ColumnGroup::Scalar => {
                if let Some(value) = resolve_column(record, *column) {
                    row.insert(column.path().to_string(), value.to_json());
                }
                continue;
            }
            ColumnGroup::Address | ColumnGroup::Geo if record.address.is_none() => continue,
            ColumnGroup::Company if record.company.is_none() => continue,
            _ => non_empty(record, *column),
        };

        // the group object is placed at its first request even if it ends up empty
        let group_key = if column.group() == ColumnGroup::Company { "company" } else { "address" };
        let Some(group) = object_at(&mut row, group_key) else {
            continue;
        };
        let Some(value) = value else {
            continue;
        };

        let target = if column.group() == ColumnGroup::Geo {
            object_at(group, "geo")
        } else {
            Some(group)
        };
        if let Some(target) = target {
            target.insert(column.leaf().to_string(), value.to_json());
        }
    }

    row.retain(|_, value| !matches!(value, Value::Object(map) if map.is_empty()));
    row
}

/// Object stored under `key`, created when missing
fn object_at<'m>(map: &'m mut Map<String, Value>, key: &str) -> Option<&'m mut Map<String, Value>> {
    map.entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

/// Resolved value, skipping empty text
fn non_empty(record: &Record, column: Column) -> Option<FieldValue<'_>> {
    resolve_column(record, column).filter(|value| !value.is_empty())
}

/// Rebuild a nested row from a flat one using the alias table
pub fn nest_flat_row(row: &Row) -> Row {
    let mut nested = Row::new();

    for (key, value) in row {
        let Some(column) = Column::from_flat_key(key) else {
            continue;
        };
        let target = match column.group() {
            ColumnGroup::Scalar => Some(&mut nested),
            ColumnGroup::Address => object_at(&mut nested, "address"),
            ColumnGroup::Geo => object_at(&mut nested, "address").and_then(|a| object_at(a, "geo")),
            ColumnGroup::Company => object_at(&mut nested, "company"),
        };
        if let Some(target) = target {
            target.insert(column.leaf().to_string(), value.clone());
        }
    }

    nested
}
