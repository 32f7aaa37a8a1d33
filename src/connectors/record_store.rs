use std::collections::HashMap;

use crate::connectors::RecordSource;
use crate::utils::{
    error::{EngineResult, SourceError},
    types::Record,
};

/// Immutable, ordered set of records loaded once at startup.
///
/// Share it as `Arc<RecordStore>`; nothing mutates it after `load`.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    by_id: HashMap<i64, usize>,
    origin: String,
}

impl RecordStore {
    /// Load every record from `source`, rejecting non-positive and duplicate ids
    pub async fn load(source: &dyn RecordSource) -> EngineResult<Self> {
        let records = source.load_all().await?;
        let store = Self::from_records(records, source.describe())?;

        tracing::info!(
            records = store.len(),
            source = %store.origin,
            source_type = %source.source_type(),
            "record store loaded"
        );

        Ok(store)
    }

    /// Build a store from records already in memory
    pub fn from_records(records: Vec<Record>, origin: impl Into<String>) -> EngineResult<Self> {
        let mut by_id = HashMap::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            if record.id <= 0 {
                return Err(SourceError::InvalidRecord(format!(
                    "record at position {} has non-positive id {}",
                    position, record.id
                ))
                .into());
            }
            if by_id.insert(record.id, position).is_some() {
                return Err(SourceError::InvalidRecord(format!("duplicate id {}", record.id)).into());
            }
        }

        Ok(Self {
            records,
            by_id,
            origin: origin.into(),
        })
    }

    /// Records in load order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Record> {
        self.by_id.get(&id).map(|&position| &self.records[position])
    }

    /// Where the records came from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::MemorySource;
    use crate::utils::error::EngineError;
    use serde_json::json;

    fn record(id: i64) -> Record {
        serde_json::from_value(json!({"id": id, "name": format!("User {}", id)})).unwrap()
    }

    #[test]
    fn test_from_records_indexes_by_id() {
        let store = RecordStore::from_records(vec![record(3), record(1), record(2)], "test").unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.records()[0].id, 3);
        assert_eq!(store.find_by_id(1).unwrap().name.as_deref(), Some("User 1"));
        assert!(store.find_by_id(9).is_none());
        assert_eq!(store.origin(), "test");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = RecordStore::from_records(vec![record(1), record(1)], "test");

        match result {
            Err(EngineError::Source(SourceError::InvalidRecord(msg))) => {
                assert!(msg.contains("duplicate id 1"));
            }
            _ => panic!("Expected InvalidRecord error"),
        }
    }

    #[test]
    fn test_non_positive_ids_rejected() {
        let result = RecordStore::from_records(vec![record(0)], "test");
        assert!(matches!(result, Err(EngineError::Source(SourceError::InvalidRecord(_)))));
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let source = MemorySource::with_sample_data();
        let store = RecordStore::load(&source).await.unwrap();

        assert_eq!(store.len(), 10);
        assert!(!store.is_empty());
        assert_eq!(store.origin(), "memory:10 records");
    }
}
