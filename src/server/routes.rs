// HTTP routes over the engine: data queries, single-record lookup, column
// catalog and dataset statistics.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::{CityBreakdown, ColumnCategory, CompanyBreakdown, Engine, StatsOverview, StatsSummary};
use crate::utils::{
    error::{EngineError, LookupError, RequestError},
    types::{parse_column_list, DataFormat, QueryRequest, QueryResponse, Record, SortOrder},
};

/// Error body, matching `{"detail": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Map an engine error to its HTTP status
fn error_response(err: EngineError) -> ApiError {
    let status = match &err {
        EngineError::Lookup(LookupError::NotFound(_)) => StatusCode::NOT_FOUND,
        EngineError::Request(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let detail = match err {
        EngineError::Lookup(inner) => inner.to_string(),
        EngineError::Request(inner) => inner.to_string(),
        other => other.to_string(),
    };

    (status, Json(ErrorResponse { detail }))
}

/// Query-string parameters of `GET /api/data`. Parsed by hand so that bad
/// values produce a 422 with a detail message.
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub columns: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub filters: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub columns: Option<String>,
    pub format: Option<String>,
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<u32>, RequestError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| RequestError::invalid(name, format!("'{}' is not a valid integer", value)))
    })
    .transpose()
}

fn parse_format(raw: Option<&str>) -> Result<DataFormat, RequestError> {
    match raw {
        None | Some("nested") => Ok(DataFormat::Nested),
        Some("flat") => Ok(DataFormat::Flat),
        Some(other) => Err(RequestError::invalid(
            "format",
            format!("'{}' must match ^(nested|flat)$", other),
        )),
    }
}

fn parse_sort_order(raw: Option<&str>) -> Result<SortOrder, RequestError> {
    match raw {
        None | Some("asc") => Ok(SortOrder::Asc),
        Some("desc") => Ok(SortOrder::Desc),
        Some(other) => Err(RequestError::invalid(
            "sort_order",
            format!("'{}' must match ^(asc|desc)$", other),
        )),
    }
}

/// Empty strings count as "not given", as with the column list
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl DataParams {
    pub fn into_request(self) -> Result<QueryRequest, RequestError> {
        Ok(QueryRequest {
            columns: non_empty(self.columns).map(|raw| parse_column_list(&raw)),
            page: parse_number("page", self.page.as_deref())?,
            limit: parse_number("limit", self.limit.as_deref())?,
            search: non_empty(self.search),
            filters: non_empty(self.filters),
            sort_by: non_empty(self.sort_by),
            sort_order: parse_sort_order(self.sort_order.as_deref())?,
            format: parse_format(self.format.as_deref())?,
        })
    }
}

/// Build the `/api/*` router
pub fn api_routes(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        // Data
        .route("/api/data", get(query_data_handler).post(query_data_post_handler))
        .route("/api/data/", get(query_data_handler).post(query_data_post_handler))
        .route("/api/data/search", get(search_handler))
        .route("/api/data/search/", get(search_handler))
        .route("/api/data/:id", get(get_record_handler))
        .route("/api/data/:id/", get(get_record_handler))
        // Column catalog
        .route("/api/columns", get(list_columns_handler))
        .route("/api/columns/", get(list_columns_handler))
        .route("/api/columns/:category", get(category_columns_handler))
        // Statistics
        .route("/api/stats", get(stats_overview_handler))
        .route("/api/stats/", get(stats_overview_handler))
        .route("/api/stats/summary", get(stats_summary_handler))
        .route("/api/stats/cities", get(city_stats_handler))
        .route("/api/stats/companies", get(company_stats_handler))
        .with_state(engine)
}

// ==================
// Health
// ==================

async fn health_handler(State(engine): State<Arc<Engine>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "datatable-engine",
        "version": env!("CARGO_PKG_VERSION"),
        "records": engine.store().len(),
        "endpoints": {
            "data": "/api/data/",
            "columns": "/api/columns/",
            "stats": "/api/stats/"
        }
    }))
}

// ==================
// Data Handlers
// ==================

async fn query_data_handler(
    State(engine): State<Arc<Engine>>,
    Query(params): Query<DataParams>,
) -> ApiResult<QueryResponse> {
    let request = params.into_request().map_err(|e| error_response(e.into()))?;
    run_query(&engine, request)
}

async fn query_data_post_handler(
    State(engine): State<Arc<Engine>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<QueryResponse> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                detail: rejection.body_text(),
            }),
        )
    })?;
    run_query(&engine, request)
}

fn run_query(engine: &Engine, request: QueryRequest) -> ApiResult<QueryResponse> {
    request
        .validate(engine.config().query.max_limit)
        .map_err(error_response)?;

    Ok(Json(engine.execute_query(&request)))
}

async fn search_handler(
    State(engine): State<Arc<Engine>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<QueryResponse> {
    let q = params
        .q
        .ok_or_else(|| error_response(RequestError::invalid("q", "field required").into()))?;
    let format = parse_format(params.format.as_deref()).map_err(|e| error_response(e.into()))?;
    let columns = non_empty(params.columns).map(|raw| parse_column_list(&raw));

    Ok(Json(engine.search(&q, columns, format)))
}

async fn get_record_handler(
    State(engine): State<Arc<Engine>>,
    Path(id): Path<String>,
) -> ApiResult<Record> {
    let id: i64 = id
        .parse()
        .map_err(|_| error_response(RequestError::invalid("user_id", format!("'{}' is not a valid integer", id)).into()))?;

    engine
        .find_by_id(id)
        .map(|record| Json(record.clone()))
        .map_err(error_response)
}

// ==================
// Column Catalog Handlers
// ==================

async fn list_columns_handler(State(engine): State<Arc<Engine>>) -> Json<Value> {
    let columns = engine.columns(None);
    Json(json!({
        "total": columns.len(),
        "columns": columns,
        "categories": engine.column_categories(),
        "description": "Available columns for data selection"
    }))
}

async fn category_columns_handler(
    State(engine): State<Arc<Engine>>,
    Path(category): Path<String>,
) -> ApiResult<Value> {
    let parsed = ColumnCategory::parse(&category).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                detail: format!("Unknown column category '{}'", category),
            }),
        )
    })?;

    let columns = engine.columns(Some(parsed));
    Ok(Json(json!({
        "total": columns.len(),
        "columns": columns,
        "category": parsed
    })))
}

// ==================
// Statistics Handlers
// ==================

async fn stats_overview_handler(State(engine): State<Arc<Engine>>) -> Json<StatsOverview> {
    Json(engine.stats_overview())
}

async fn stats_summary_handler(State(engine): State<Arc<Engine>>) -> Json<StatsSummary> {
    Json(engine.stats_summary())
}

async fn city_stats_handler(State(engine): State<Arc<Engine>>) -> Json<CityBreakdown> {
    Json(engine.city_stats())
}

async fn company_stats_handler(State(engine): State<Arc<Engine>>) -> Json<CompanyBreakdown> {
    Json(engine.company_stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_params_into_request() {
        let params = DataParams {
            columns: Some("id, name ,address.city".to_string()),
            page: Some("2".to_string()),
            limit: Some("10".to_string()),
            sort_order: Some("desc".to_string()),
            format: Some("flat".to_string()),
            search: Some(String::new()),
            ..DataParams::default()
        };

        let request = params.into_request().unwrap();
        assert_eq!(
            request.columns,
            Some(vec!["id".to_string(), "name".to_string(), "address.city".to_string()])
        );
        assert_eq!(request.page, Some(2));
        assert_eq!(request.limit, Some(10));
        assert_eq!(request.sort_order, SortOrder::Desc);
        assert_eq!(request.format, DataFormat::Flat);
        assert_eq!(request.search, None);
    }

    #[test]
    fn test_data_params_rejects_bad_values() {
        let bad_page = DataParams {
            page: Some("-1".to_string()),
            ..DataParams::default()
        };
        assert!(bad_page.into_request().is_err());

        let bad_format = DataParams {
            format: Some("xml".to_string()),
            ..DataParams::default()
        };
        match bad_format.into_request() {
            Err(RequestError::InvalidParameter { name, .. }) => assert_eq!(name, "format"),
            _ => panic!("Expected InvalidParameter error"),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, body) = error_response(LookupError::NotFound(3).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0.detail, "User with ID 3 not found");

        let (status, _) = error_response(RequestError::invalid("limit", "too big").into());
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = error_response(
            LookupError::InvalidRecord {
                id: 1,
                reason: "bad".to_string(),
            }
            .into(),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
