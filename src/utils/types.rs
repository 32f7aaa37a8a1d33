use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::error::{EngineResult, RequestError};

/// A projected output row. Keys keep insertion order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A user record as held by the record store
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Record {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "catchPhrase", default, skip_serializing_if = "Option::is_none")]
    pub catch_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

impl Record {
    /// Check the record against the user rules enforced on single-record retrieval
    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.name.as_deref().map(|s| s.chars().count()).unwrap_or(0);
        if !(1..=100).contains(&name_len) {
            return Err("name must be between 1 and 100 characters".to_string());
        }

        let username_len = self.username.as_deref().map(|s| s.chars().count()).unwrap_or(0);
        if !(1..=50).contains(&username_len) {
            return Err("username must be between 1 and 50 characters".to_string());
        }

        match self.email.as_deref() {
            Some(email) if email.contains('@') => {}
            Some(_) => return Err("Invalid email format".to_string()),
            None => return Err("email is required".to_string()),
        }

        let website = self.website.as_deref().ok_or_else(|| "website is required".to_string())?;
        let has_scheme = ["http://", "https://", "www."].iter().any(|p| website.starts_with(p));
        if !website.is_empty() && !has_scheme && !website.contains('.') {
            return Err("Invalid website format".to_string());
        }

        if self.phone.is_none() {
            return Err("phone is required".to_string());
        }
        let address = self.address.as_ref().ok_or_else(|| "address is required".to_string())?;
        required("address.street", &address.street)?;
        required("address.suite", &address.suite)?;
        required("address.city", &address.city)?;
        required("address.zipcode", &address.zipcode)?;
        let geo = address.geo.as_ref().ok_or_else(|| "address.geo is required".to_string())?;
        required("address.geo.lat", &geo.lat)?;
        required("address.geo.lng", &geo.lng)?;

        let company = self.company.as_ref().ok_or_else(|| "company is required".to_string())?;
        required("company.name", &company.name)?;
        required("company.catchPhrase", &company.catch_phrase)?;
        required("company.bs", &company.bs)?;

        Ok(())
    }
}

fn required(field: &str, value: &Option<String>) -> Result<(), String> {
    match value {
        Some(_) => Ok(()),
        None => Err(format!("{} is required", field)),
    }
}

/// Output shape of projected rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Preserve the `address`/`company` sub-objects
    #[default]
    Nested,
    /// Every field at the top level under its flat alias
    Flat,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Nested => write!(f, "nested"),
            DataFormat::Flat => write!(f, "flat"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A declarative query over the record store
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryRequest {
    pub columns: Option<Vec<String>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    /// Raw `key:value,key2:op value2` expression
    pub filters: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub format: DataFormat,
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn with_filters(mut self, filters: &str) -> Self {
        self.filters = Some(filters.to_string());
        self
    }

    pub fn with_sort(mut self, sort_by: &str, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.to_string());
        self.sort_order = sort_order;
        self
    }

    pub fn with_format(mut self, format: DataFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate pagination bounds. Used by the request surfaces only; the
    /// engine itself accepts any request.
    pub fn validate(&self, max_limit: u32) -> EngineResult<()> {
        if let Some(page) = self.page {
            if page < 1 {
                return Err(RequestError::invalid("page", "must be greater than or equal to 1").into());
            }
        }

        if let Some(limit) = self.limit {
            if limit < 1 || limit > max_limit {
                return Err(RequestError::invalid(
                    "limit",
                    format!("must be between 1 and {}", max_limit),
                )
                .into());
            }
        }

        Ok(())
    }
}

/// Split a comma-separated column list, trimming each entry
pub fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|col| col.trim().to_string()).collect()
}

/// Page metadata for a paginated response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Result of executing a query
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryResponse {
    pub data: Vec<Row>,
    pub columns: Vec<String>,
    pub total: usize,
    pub pagination: Option<Pagination>,
    pub format: DataFormat,
}

impl QueryResponse {
    /// An empty response in the given format
    pub fn empty(format: DataFormat) -> Self {
        Self {
            data: Vec::new(),
            columns: Vec::new(),
            total: 0,
            pagination: None,
            format,
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
