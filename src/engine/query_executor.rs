use std::sync::Arc;

use crate::connectors::RecordStore;
use crate::engine::column_catalog::{resolve_selection, Column};
use crate::engine::field_resolver::{self, FieldValue};
use crate::engine::predicate_compiler::{Constraint, DefaultPredicateCompiler, PredicateCompiler};
use crate::engine::projector;
use crate::utils::types::{DataFormat, Pagination, QueryRequest, QueryResponse, Record, SortOrder};

/// Fields the free-text search looks at
pub const SEARCH_FIELDS: &[&str] = &[
    "id",
    "name",
    "username",
    "email",
    "phone",
    "website",
    "address.city",
    "address.street",
    "company.name",
    "company.catchPhrase",
];

/// Top-level keys of a full nested record, reported when no columns are selected
const NESTED_TOP_LEVEL: &[&str] = &[
    "id", "name", "username", "email", "address", "phone", "website", "company",
];

/// Recognised `sort_by` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Name,
    Username,
    Email,
    Phone,
    Website,
    City,
    Street,
    CompanyName,
    CatchPhrase,
}

/// Extracted sort value. Only ids compare numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Number(i64),
    Text(String),
}

impl SortKey {
    pub fn parse(name: &str) -> Option<SortKey> {
        let key = match name {
            "id" => SortKey::Id,
            "name" => SortKey::Name,
            "username" => SortKey::Username,
            "email" => SortKey::Email,
            "phone" => SortKey::Phone,
            "website" => SortKey::Website,
            "city" | "address.city" => SortKey::City,
            "street" | "address.street" => SortKey::Street,
            "company" | "company.name" => SortKey::CompanyName,
            "company.catchPhrase" => SortKey::CatchPhrase,
            _ => return None,
        };
        Some(key)
    }

    fn column(self) -> Column {
        match self {
            SortKey::Id => Column::Id,
            SortKey::Name => Column::Name,
            SortKey::Username => Column::Username,
            SortKey::Email => Column::Email,
            SortKey::Phone => Column::Phone,
            SortKey::Website => Column::Website,
            SortKey::City => Column::City,
            SortKey::Street => Column::Street,
            SortKey::CompanyName => Column::CompanyName,
            SortKey::CatchPhrase => Column::CompanyCatchPhrase,
        }
    }

    /// Missing text values sort as the empty string
    fn value_of(self, record: &Record) -> SortValue {
        match field_resolver::resolve_column(record, self.column()) {
            Some(FieldValue::Integer(i)) => SortValue::Number(i),
            Some(FieldValue::Text(s)) => SortValue::Text(s.to_lowercase()),
            None => SortValue::Text(String::new()),
        }
    }
}

/// Trait for query execution functionality
pub trait QueryExecutor: Send + Sync {
    /// Run a query end to end. Bad query input degrades the result instead of failing.
    fn execute(&self, request: &QueryRequest) -> QueryResponse;
}

/// Default implementation of QueryExecutor over a shared record store
pub struct DefaultQueryExecutor {
    store: Arc<RecordStore>,
    compiler: Box<dyn PredicateCompiler>,
}

impl DefaultQueryExecutor {
    /// Create a query executor with the default predicate compiler
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self::with_compiler(store, Box::new(DefaultPredicateCompiler::new()))
    }

    pub fn with_compiler(store: Arc<RecordStore>, compiler: Box<dyn PredicateCompiler>) -> Self {
        Self { store, compiler }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Keep records where the term appears in any search field
    fn apply_search<'r>(&self, records: Vec<&'r Record>, term: Option<&str>) -> Vec<&'r Record> {
        let term = match term {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return records,
        };

        records
            .into_iter()
            .filter(|record| {
                SEARCH_FIELDS.iter().any(|path| {
                    field_resolver::resolve(record, path)
                        .map(|value| value.to_text().to_lowercase().contains(&term))
                        .unwrap_or(false)
                })
            })
            .collect()
    }

    /// Keep records satisfying every constraint
    fn apply_filters<'r>(&self, records: Vec<&'r Record>, constraints: &[Constraint]) -> Vec<&'r Record> {
        if constraints.is_empty() {
            return records;
        }

        records
            .into_iter()
            .filter(|record| constraints.iter().all(|constraint| constraint.matches(record)))
            .collect()
    }

    /// Stable sort by a recognised key; anything else keeps the current order
    fn apply_sort(&self, records: &mut [&Record], sort_by: Option<&str>, order: SortOrder) {
        let Some(name) = sort_by else {
            return;
        };
        let Some(key) = SortKey::parse(name) else {
            tracing::warn!(sort_by = name, "unknown sort key, order unchanged");
            return;
        };

        let mut keyed: Vec<(SortValue, &Record)> =
            records.iter().map(|record| (key.value_of(record), *record)).collect();

        keyed.sort_by(|(a, _), (b, _)| match order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
        });

        for (slot, (_, record)) in records.iter_mut().zip(keyed) {
            *slot = record;
        }
    }

    /// Names reported in `QueryResponse::columns`. A selection is echoed as
    /// given, unknown names included; only the rows skip them.
    fn response_columns(requested: Option<&[String]>, format: DataFormat) -> Vec<String> {
        match (requested, format) {
            (Some(requested), _) => requested.to_vec(),
            (None, DataFormat::Flat) => Column::ALL.iter().map(|c| c.path().to_string()).collect(),
            (None, DataFormat::Nested) => NESTED_TOP_LEVEL.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Compute the page window over `total` items. `None` when either bound is missing.
pub fn paginate(total: usize, page: Option<u32>, limit: Option<u32>) -> Option<(Pagination, std::ops::Range<usize>)> {
    let (page, limit) = (page?, limit?);

    let pages = if limit == 0 {
        0
    } else {
        total.div_ceil(limit as usize)
    };

    let window = if page == 0 {
        0..0
    } else {
        let start = ((page - 1) as usize).saturating_mul(limit as usize).min(total);
        let end = start.saturating_add(limit as usize).min(total);
        start..end
    };

    let pagination = Pagination {
        page,
        limit,
        total,
        pages,
        has_next: window.end < total && limit > 0 && page > 0,
        has_prev: page > 1,
    };

    Some((pagination, window))
}

impl QueryExecutor for DefaultQueryExecutor {
    fn execute(&self, request: &QueryRequest) -> QueryResponse {
        let constraints = request
            .filters
            .as_deref()
            .map(|expression| self.compiler.compile(expression))
            .unwrap_or_default();

        let records: Vec<&Record> = self.store.iter().collect();

        let records = self.apply_search(records, request.search.as_deref());
        tracing::debug!(remaining = records.len(), "after search");

        let mut records = self.apply_filters(records, &constraints);
        tracing::debug!(remaining = records.len(), constraints = constraints.len(), "after filter");

        self.apply_sort(&mut records, request.sort_by.as_deref(), request.sort_order);
        tracing::debug!(sort_by = ?request.sort_by, order = ?request.sort_order, "after sort");

        let total = records.len();
        let page = paginate(total, request.page, request.limit);
        let window = page
            .as_ref()
            .map(|(_, window)| window.clone())
            .unwrap_or(0..total);

        let requested = request.columns.as_deref().filter(|columns| !columns.is_empty());
        let columns: Option<Vec<Column>> = requested
            .map(resolve_selection)
            .map(|selection| selection.into_iter().map(|(column, _)| column).collect());

        let data = projector::project(&records[window.clone()], columns.as_deref(), request.format);
        tracing::debug!(total, start = window.start, rows = data.len(), "page sliced");

        QueryResponse {
            data,
            columns: Self::response_columns(requested, request.format),
            total,
            pagination: page.map(|(pagination, _)| pagination),
            format: request.format,
        }
    }
}
