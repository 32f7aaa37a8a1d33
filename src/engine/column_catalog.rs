use serde::Serialize;

/// One of the fifteen selectable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Username,
    Email,
    Phone,
    Website,
    Street,
    Suite,
    City,
    Zipcode,
    Lat,
    Lng,
    CompanyName,
    CompanyCatchPhrase,
    CompanyBs,
}

/// Which part of the record a column lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGroup {
    Scalar,
    Address,
    Geo,
    Company,
}

/// Column categories used for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    Basic,
    Address,
    Company,
}

impl Column {
    /// Catalog order
    pub const ALL: [Column; 15] = [
        Column::Id,
        Column::Name,
        Column::Username,
        Column::Email,
        Column::Phone,
        Column::Website,
        Column::Street,
        Column::Suite,
        Column::City,
        Column::Zipcode,
        Column::Lat,
        Column::Lng,
        Column::CompanyName,
        Column::CompanyCatchPhrase,
        Column::CompanyBs,
    ];

    /// Dotted path into the nested record
    pub fn path(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Username => "username",
            Column::Email => "email",
            Column::Phone => "phone",
            Column::Website => "website",
            Column::Street => "address.street",
            Column::Suite => "address.suite",
            Column::City => "address.city",
            Column::Zipcode => "address.zipcode",
            Column::Lat => "address.geo.lat",
            Column::Lng => "address.geo.lng",
            Column::CompanyName => "company.name",
            Column::CompanyCatchPhrase => "company.catchPhrase",
            Column::CompanyBs => "company.bs",
        }
    }

    /// Key used in the flat shape
    pub fn flat_key(self) -> &'static str {
        match self {
            Column::Street => "street",
            Column::Suite => "suite",
            Column::City => "city",
            Column::Zipcode => "zipcode",
            Column::Lat => "lat",
            Column::Lng => "lng",
            Column::CompanyName => "company_name",
            Column::CompanyCatchPhrase => "company_catchphrase",
            Column::CompanyBs => "company_bs",
            scalar => scalar.path(),
        }
    }

    /// Last segment of the dotted path
    pub fn leaf(self) -> &'static str {
        let path = self.path();
        path.rsplit('.').next().unwrap_or(path)
    }

    pub fn group(self) -> ColumnGroup {
        match self {
            Column::Street | Column::Suite | Column::City | Column::Zipcode => ColumnGroup::Address,
            Column::Lat | Column::Lng => ColumnGroup::Geo,
            Column::CompanyName | Column::CompanyCatchPhrase | Column::CompanyBs => ColumnGroup::Company,
            _ => ColumnGroup::Scalar,
        }
    }

    pub fn category(self) -> ColumnCategory {
        match self.group() {
            ColumnGroup::Scalar => ColumnCategory::Basic,
            ColumnGroup::Address | ColumnGroup::Geo => ColumnCategory::Address,
            ColumnGroup::Company => ColumnCategory::Company,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Column::Id => "User ID",
            Column::Name => "Full Name",
            Column::Username => "Username",
            Column::Email => "Email Address",
            Column::Phone => "Phone Number",
            Column::Website => "Website",
            Column::Street => "Street Address",
            Column::Suite => "Suite/Apartment",
            Column::City => "City",
            Column::Zipcode => "ZIP Code",
            Column::Lat => "Latitude",
            Column::Lng => "Longitude",
            Column::CompanyName => "Company Name",
            Column::CompanyCatchPhrase => "Company Slogan",
            Column::CompanyBs => "Business Strategy",
        }
    }

    /// Look up a column by its dotted path
    pub fn from_path(path: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.path() == path)
    }

    /// Look up a column by its flat alias
    pub fn from_flat_key(key: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.flat_key() == key)
    }

    /// Accept either spelling of a column name
    pub fn parse(name: &str) -> Option<Column> {
        Column::from_path(name).or_else(|| Column::from_flat_key(name))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl ColumnCategory {
    pub const ALL: [ColumnCategory; 3] = [
        ColumnCategory::Basic,
        ColumnCategory::Address,
        ColumnCategory::Company,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnCategory::Basic => "basic",
            ColumnCategory::Address => "address",
            ColumnCategory::Company => "company",
        }
    }

    pub fn parse(name: &str) -> Option<ColumnCategory> {
        ColumnCategory::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Columns in this category, in catalog order
    pub fn columns(self) -> Vec<Column> {
        Column::ALL.into_iter().filter(|c| c.category() == self).collect()
    }
}

/// Ordered path → description listing
pub fn describe_columns(columns: &[Column]) -> serde_json::Map<String, serde_json::Value> {
    columns
        .iter()
        .map(|c| (c.path().to_string(), serde_json::Value::from(c.description())))
        .collect()
}

/// Ordered category → paths listing
pub fn column_categories() -> serde_json::Map<String, serde_json::Value> {
    ColumnCategory::ALL
        .into_iter()
        .map(|category| {
            let paths: Vec<serde_json::Value> = category
                .columns()
                .into_iter()
                .map(|c| serde_json::Value::from(c.path()))
                .collect();
            (category.as_str().to_string(), serde_json::Value::Array(paths))
        })
        .collect()
}

/// Resolve requested column names to catalog columns, dropping unknown names
/// and repeats. Returns the columns together with the spelling first used.
pub fn resolve_selection(requested: &[String]) -> Vec<(Column, String)> {
    let mut selection: Vec<(Column, String)> = Vec::new();

    for name in requested {
        match Column::parse(name) {
            Some(column) => {
                if !selection.iter().any(|(c, _)| *c == column) {
                    selection.push((column, name.clone()));
                }
            }
            None if name.is_empty() => {}
            None => tracing::warn!(column = %name, "column not found in catalog, ignoring"),
        }
    }

    selection
}
