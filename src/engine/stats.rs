use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::utils::types::Record;

/// Dataset-wide distinct value counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsOverview {
    pub total_users: usize,
    pub unique_cities: usize,
    pub unique_companies: usize,
    pub unique_email_domains: usize,
    pub cities: Vec<String>,
    pub companies: Vec<String>,
    pub email_domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    pub users_with_address: usize,
    pub users_with_company: usize,
    pub users_with_email: usize,
    pub users_with_phone: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographicDistribution {
    pub total_cities: usize,
    pub users_per_city_avg: f64,
}

/// Dashboard summary with top-5 breakdowns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_users: usize,
    pub data_quality: DataQuality,
    pub top_cities: serde_json::Map<String, serde_json::Value>,
    pub top_companies: serde_json::Map<String, serde_json::Value>,
    pub top_email_domains: serde_json::Map<String, serde_json::Value>,
    pub geographic_distribution: GeographicDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityStats {
    pub user_count: usize,
    pub unique_zipcodes: usize,
    pub unique_companies: usize,
    pub zipcodes: Vec<String>,
    pub companies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityBreakdown {
    pub cities: BTreeMap<String, CityStats>,
    pub total_cities: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyStats {
    pub employee_count: usize,
    pub cities_present: Vec<String>,
    pub city_count: usize,
    pub catchphrase: String,
    pub business_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyBreakdown {
    pub companies: BTreeMap<String, CompanyStats>,
    pub total_companies: usize,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn city_of(record: &Record) -> Option<&str> {
    non_empty(record.address.as_ref().and_then(|a| a.city.as_ref()))
}

fn company_of(record: &Record) -> Option<&str> {
    non_empty(record.company.as_ref().and_then(|c| c.name.as_ref()))
}

/// Text after the last `@`, or the whole address when there is none
fn email_domain(record: &Record) -> Option<&str> {
    non_empty(record.email.as_ref()).map(|email| email.rsplit('@').next().unwrap_or(email))
}

/// Occurrence counts that remember first-seen order
#[derive(Default)]
struct Counter<'a> {
    order: Vec<&'a str>,
    counts: HashMap<&'a str, usize>,
}

impl<'a> Counter<'a> {
    fn add(&mut self, value: &'a str) {
        let count = self.counts.entry(value).or_insert(0);
        if *count == 0 {
            self.order.push(value);
        }
        *count += 1;
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    /// The `n` highest counts; ties keep first-seen order
    fn most_common(&self, n: usize) -> serde_json::Map<String, serde_json::Value> {
        let mut ranked: Vec<(&str, usize)> = self
            .order
            .iter()
            .map(|value| (*value, self.counts.get(value).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .take(n)
            .map(|(value, count)| (value.to_string(), serde_json::Value::from(count)))
            .collect()
    }
}

pub fn overview(records: &[Record]) -> StatsOverview {
    let cities: BTreeSet<&str> = records.iter().filter_map(city_of).collect();
    let companies: BTreeSet<&str> = records.iter().filter_map(company_of).collect();
    let domains: BTreeSet<&str> = records.iter().filter_map(email_domain).collect();

    let to_vec = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect::<Vec<_>>();

    StatsOverview {
        total_users: records.len(),
        unique_cities: cities.len(),
        unique_companies: companies.len(),
        unique_email_domains: domains.len(),
        cities: to_vec(cities),
        companies: to_vec(companies),
        email_domains: to_vec(domains),
    }
}

pub fn summary(records: &[Record]) -> StatsSummary {
    let mut cities = Counter::default();
    let mut companies = Counter::default();
    let mut domains = Counter::default();

    for record in records {
        if let Some(city) = city_of(record) {
            cities.add(city);
        }
        if let Some(company) = company_of(record) {
            companies.add(company);
        }
        if let Some(domain) = email_domain(record) {
            domains.add(domain);
        }
    }

    let users_per_city_avg = if cities.len() == 0 {
        0.0
    } else {
        records.len() as f64 / cities.len() as f64
    };

    StatsSummary {
        total_users: records.len(),
        data_quality: DataQuality {
            users_with_address: records.iter().filter(|r| r.address.is_some()).count(),
            users_with_company: records.iter().filter(|r| r.company.is_some()).count(),
            users_with_email: records.iter().filter(|r| non_empty(r.email.as_ref()).is_some()).count(),
            users_with_phone: records.iter().filter(|r| non_empty(r.phone.as_ref()).is_some()).count(),
        },
        top_cities: cities.most_common(5),
        top_companies: companies.most_common(5),
        top_email_domains: domains.most_common(5),
        geographic_distribution: GeographicDistribution {
            total_cities: cities.len(),
            users_per_city_avg,
        },
    }
}

pub fn city_breakdown(records: &[Record]) -> CityBreakdown {
    let mut grouped: BTreeMap<&str, (usize, BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();

    for record in records {
        let Some(city) = city_of(record) else {
            continue;
        };
        let entry = grouped.entry(city).or_default();
        entry.0 += 1;
        if let Some(zipcode) = non_empty(record.address.as_ref().and_then(|a| a.zipcode.as_ref())) {
            entry.1.insert(zipcode);
        }
        if let Some(company) = company_of(record) {
            entry.2.insert(company);
        }
    }

    let cities: BTreeMap<String, CityStats> = grouped
        .into_iter()
        .map(|(city, (count, zipcodes, companies))| {
            let stats = CityStats {
                user_count: count,
                unique_zipcodes: zipcodes.len(),
                unique_companies: companies.len(),
                zipcodes: zipcodes.into_iter().map(str::to_string).collect(),
                companies: companies.into_iter().map(str::to_string).collect(),
            };
            (city.to_string(), stats)
        })
        .collect();

    CityBreakdown {
        total_cities: cities.len(),
        cities,
    }
}

pub fn company_breakdown(records: &[Record]) -> CompanyBreakdown {
    let mut companies: BTreeMap<String, CompanyStats> = BTreeMap::new();
    let mut cities: HashMap<String, BTreeSet<&str>> = HashMap::new();

    for record in records {
        let Some(name) = company_of(record) else {
            continue;
        };

        let stats = companies.entry(name.to_string()).or_insert_with(|| {
            let company = record.company.as_ref();
            CompanyStats {
                employee_count: 0,
                cities_present: Vec::new(),
                city_count: 0,
                catchphrase: company.and_then(|c| c.catch_phrase.clone()).unwrap_or_default(),
                business_strategy: company.and_then(|c| c.bs.clone()).unwrap_or_default(),
            }
        });
        stats.employee_count += 1;

        let present = cities.entry(name.to_string()).or_default();
        if let Some(city) = city_of(record) {
            present.insert(city);
        }
    }

    for (name, stats) in companies.iter_mut() {
        if let Some(present) = cities.remove(name) {
            stats.city_count = present.len();
            stats.cities_present = present.into_iter().map(str::to_string).collect();
        }
    }

    CompanyBreakdown {
        total_companies: companies.len(),
        companies,
    }
}
