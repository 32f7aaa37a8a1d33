use crate::engine::column_catalog::Column;
use crate::utils::types::{Address, Company, Geo, Record};

/// A leaf value resolved from a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Text(&'a str),
}

impl<'a> FieldValue<'a> {
    /// String form used by search, substring matching and sorting
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Text(s) => s.to_string(),
        }
    }

    /// Absent or empty values are skipped by nested-field projection
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Text(s) => serde_json::Value::from(*s),
        }
    }
}

/// Position reached while walking a dotted path
enum Cursor<'a> {
    Record(&'a Record),
    Address(&'a Address),
    Geo(&'a Geo),
    Company(&'a Company),
    Leaf(FieldValue<'a>),
}

impl<'a> Cursor<'a> {
    fn step(self, segment: &str) -> Option<Cursor<'a>> {
        match self {
            Cursor::Record(record) => match segment {
                "id" => Some(Cursor::Leaf(FieldValue::Integer(record.id))),
                "name" => text(&record.name),
                "username" => text(&record.username),
                "email" => text(&record.email),
                "phone" => text(&record.phone),
                "website" => text(&record.website),
                "address" => record.address.as_ref().map(Cursor::Address),
                "company" => record.company.as_ref().map(Cursor::Company),
                _ => None,
            },
            Cursor::Address(address) => match segment {
                "street" => text(&address.street),
                "suite" => text(&address.suite),
                "city" => text(&address.city),
                "zipcode" => text(&address.zipcode),
                "geo" => address.geo.as_ref().map(Cursor::Geo),
                _ => None,
            },
            Cursor::Geo(geo) => match segment {
                "lat" => text(&geo.lat),
                "lng" => text(&geo.lng),
                _ => None,
            },
            Cursor::Company(company) => match segment {
                "name" => text(&company.name),
                "catchPhrase" => text(&company.catch_phrase),
                "bs" => text(&company.bs),
                _ => None,
            },
            // nothing below a leaf
            Cursor::Leaf(_) => None,
        }
    }
}

fn text(value: &Option<String>) -> Option<Cursor<'_>> {
    value.as_deref().map(|s| Cursor::Leaf(FieldValue::Text(s)))
}

/// Walk a dotted path through the record. Missing segments, and paths that
/// stop on a nested object instead of a leaf, resolve to `None`.
pub fn resolve_dotted<'a>(record: &'a Record, path: &str) -> Option<FieldValue<'a>> {
    let mut cursor = Cursor::Record(record);
    for segment in path.split('.') {
        cursor = cursor.step(segment)?;
    }

    match cursor {
        Cursor::Leaf(value) => Some(value),
        _ => None,
    }
}

/// Resolve a column path against a record: dotted paths walk the nested
/// structure, anything else goes through the flat alias table.
pub fn resolve<'a>(record: &'a Record, path: &str) -> Option<FieldValue<'a>> {
    if path.contains('.') {
        resolve_dotted(record, path)
    } else {
        let column = Column::from_flat_key(path)?;
        resolve_dotted(record, column.path())
    }
}

/// Resolve a catalog column
pub fn resolve_column(record: &Record, column: Column) -> Option<FieldValue<'_>> {
    resolve_dotted(record, column.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Leanne Graham",
            "address": {
                "city": "Reno",
                "street": "",
                "geo": {"lat": "-37.3159"}
            },
            "company": {"name": "Romaguera-Crona", "catchPhrase": "Multi-layered"}
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_scalar_and_id() {
        let record = record();
        assert_eq!(resolve(&record, "id"), Some(FieldValue::Integer(7)));
        assert_eq!(resolve(&record, "name"), Some(FieldValue::Text("Leanne Graham")));
        assert_eq!(resolve(&record, "email"), None);
    }

    #[test]
    fn test_resolve_dotted_paths() {
        let record = record();
        assert_eq!(resolve(&record, "address.city"), Some(FieldValue::Text("Reno")));
        assert_eq!(resolve(&record, "address.geo.lat"), Some(FieldValue::Text("-37.3159")));
        assert_eq!(resolve(&record, "address.geo.lng"), None);
        assert_eq!(
            resolve(&record, "company.catchPhrase"),
            Some(FieldValue::Text("Multi-layered"))
        );
    }

    #[test]
    fn test_resolve_flat_aliases() {
        let record = record();
        assert_eq!(resolve(&record, "city"), Some(FieldValue::Text("Reno")));
        assert_eq!(resolve(&record, "lat"), Some(FieldValue::Text("-37.3159")));
        assert_eq!(resolve(&record, "company_name"), Some(FieldValue::Text("Romaguera-Crona")));
        assert_eq!(resolve(&record, "company_bs"), None);
    }

    #[test]
    fn test_unknown_and_non_leaf_paths_are_absent() {
        let record = record();
        assert_eq!(resolve(&record, "address"), None);
        assert_eq!(resolve(&record, "address.geo"), None);
        assert_eq!(resolve(&record, "address.city.extra"), None);
        assert_eq!(resolve(&record, "company.catchphrase"), None);
        assert_eq!(resolve(&record, "nope.city"), None);
        assert_eq!(resolve(&record, ""), None);
    }

    #[test]
    fn test_missing_intermediate_object() {
        let bare: Record = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(resolve(&bare, "address.geo.lat"), None);
        assert_eq!(resolve(&bare, "company_name"), None);
    }

    #[test]
    fn test_field_value_helpers() {
        assert_eq!(FieldValue::Integer(12).to_text(), "12");
        assert!(FieldValue::Text("").is_empty());
        assert!(!FieldValue::Integer(0).is_empty());
        assert_eq!(FieldValue::Text("x").to_json(), json!("x"));
    }
}
