use std::sync::Arc;

use crate::{
    connectors::{FileSource, RecordSource, RecordStore},
    engine::{
        column_catalog::{self, Column, ColumnCategory},
        stats::{self, CityBreakdown, CompanyBreakdown, StatsOverview, StatsSummary},
        DefaultQueryExecutor, QueryExecutor,
    },
    utils::{
        config::EngineConfig,
        error::{EngineError, EngineResult, LookupError},
        types::{DataFormat, QueryRequest, QueryResponse, Record},
    },
};

/// Main engine that owns the record store and coordinates query components.
///
/// Cheap to clone; every clone shares the same immutable store.
#[derive(Clone)]
pub struct Engine {
    /// Engine configuration
    config: EngineConfig,
    /// Records loaded at startup
    store: Arc<RecordStore>,
    /// Query executor over `store`
    query_executor: Arc<dyn QueryExecutor>,
}

impl Engine {
    /// Load the configured data file and build an engine over it.
    ///
    /// Fails when the data source is missing or malformed; the caller must not
    /// serve queries in that case.
    pub async fn initialize(config: EngineConfig) -> EngineResult<Self> {
        let source = FileSource::new(config.data.path.clone());
        Self::from_source(config, &source).await
    }

    /// Build an engine from any record source
    pub async fn from_source(config: EngineConfig, source: &dyn RecordSource) -> EngineResult<Self> {
        let store = RecordStore::load(source).await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Build an engine over an already loaded store
    pub fn with_store(config: EngineConfig, store: Arc<RecordStore>) -> Self {
        let query_executor = Arc::new(DefaultQueryExecutor::new(store.clone()));
        Self {
            config,
            store,
            query_executor,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Execute a query through the engine. Never fails on query input.
    pub fn execute_query(&self, request: &QueryRequest) -> QueryResponse {
        self.query_executor.execute(request)
    }

    /// Free-text search with optional projection. An empty term yields an empty response.
    pub fn search(&self, term: &str, columns: Option<Vec<String>>, format: DataFormat) -> QueryResponse {
        if term.is_empty() {
            return QueryResponse::empty(format);
        }

        let request = QueryRequest {
            columns,
            search: Some(term.to_string()),
            format,
            ..QueryRequest::default()
        };
        self.execute_query(&request)
    }

    /// Fetch a single record by id, checking it against the record rules
    pub fn find_by_id(&self, id: i64) -> EngineResult<&Record> {
        let record = self.store.find_by_id(id).ok_or(LookupError::NotFound(id))?;

        record
            .validate()
            .map_err(|reason| EngineError::from(LookupError::InvalidRecord { id, reason }))?;

        Ok(record)
    }

    /// Columns with their descriptions, optionally restricted to one category
    pub fn columns(&self, category: Option<ColumnCategory>) -> serde_json::Map<String, serde_json::Value> {
        let columns = match category {
            Some(category) => category.columns(),
            None => Column::ALL.to_vec(),
        };
        column_catalog::describe_columns(&columns)
    }

    /// Category name to column paths
    pub fn column_categories(&self) -> serde_json::Map<String, serde_json::Value> {
        column_catalog::column_categories()
    }

    pub fn stats_overview(&self) -> StatsOverview {
        stats::overview(self.store.records())
    }

    pub fn stats_summary(&self) -> StatsSummary {
        stats::summary(self.store.records())
    }

    pub fn city_stats(&self) -> CityBreakdown {
        stats::city_breakdown(self.store.records())
    }

    pub fn company_stats(&self) -> CompanyBreakdown {
        stats::company_breakdown(self.store.records())
    }
}

/// Builder for creating Engine instances
pub struct EngineBuilder {
    config: EngineConfig,
    source: Option<Box<dyn RecordSource>>,
}

impl EngineBuilder {
    /// Create a new engine builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            source: None,
        }
    }

    /// Set the engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load from this source instead of the configured data path
    pub fn with_source(mut self, source: Box<dyn RecordSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Load the records and build the engine
    pub async fn build(self) -> EngineResult<Engine> {
        match self.source {
            Some(source) => Engine::from_source(self.config, source.as_ref()).await,
            None => Engine::initialize(self.config).await,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::MemorySource;
    use crate::utils::error::SourceError;

    async fn engine() -> Engine {
        EngineBuilder::new()
            .with_source(Box::new(MemorySource::with_sample_data()))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_builder_with_memory_source() {
        let engine = engine().await;
        assert_eq!(engine.store().len(), 10);
        assert_eq!(engine.config().query.max_limit, 100);
    }

    #[tokio::test]
    async fn test_initialize_with_missing_file() {
        let mut config = EngineConfig::default();
        config.data.path = "/nonexistent/data.json".to_string();

        match Engine::initialize(config).await {
            Err(EngineError::Source(SourceError::NotFound(path))) => {
                assert_eq!(path, "/nonexistent/data.json");
            }
            Err(e) => panic!("Expected NotFound error, got {}", e),
            Ok(_) => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let engine = engine().await;

        assert_eq!(engine.find_by_id(3).unwrap().name.as_deref(), Some("Clementine Bauch"));

        match engine.find_by_id(99) {
            Err(EngineError::Lookup(LookupError::NotFound(id))) => assert_eq!(id, 99),
            _ => panic!("Expected Lookup NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_rejects_invalid_record() {
        let mut record = crate::connectors::sample_records().remove(0);
        record.email = Some("no-at-sign".to_string());
        let engine = EngineBuilder::new()
            .with_source(Box::new(MemorySource::new(vec![record])))
            .build()
            .await
            .unwrap();

        match engine.find_by_id(1) {
            Err(EngineError::Lookup(LookupError::InvalidRecord { id, reason })) => {
                assert_eq!(id, 1);
                assert_eq!(reason, "Invalid email format");
            }
            _ => panic!("Expected InvalidRecord error"),
        }
    }

    #[tokio::test]
    async fn test_search_shortcut() {
        let engine = engine().await;

        let empty = engine.search("", None, DataFormat::Nested);
        assert_eq!(empty, QueryResponse::empty(DataFormat::Nested));

        let response = engine.search("karianne", Some(vec!["id".to_string()]), DataFormat::Flat);
        assert_eq!(response.total, 1);
        assert_eq!(response.columns, vec!["id"]);
        assert_eq!(response.format, DataFormat::Flat);
    }

    #[tokio::test]
    async fn test_columns_by_category() {
        let engine = engine().await;

        assert_eq!(engine.columns(None).len(), 15);
        assert_eq!(engine.columns(Some(ColumnCategory::Company)).len(), 3);
        assert_eq!(engine.column_categories().len(), 3);
    }
}
