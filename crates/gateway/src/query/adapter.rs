//! Query DSL builder for structured log searches.
//!
//! Translates a [`SearchRequestSpec`] into a search body. The translation is a
//! pure function of the request and the adapter configuration: no I/O, no
//! hidden state, and malformed optional fields are treated as absent.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ConfigError;
use crate::types::{
    GROUP_STATS_AGG, GroupBy, LogFilters, PaginationMode, SearchRequestSpec, SortOrder, TimeRange,
};

use super::fields::{
    ID_FIELD, LEVEL_FIELDS, MESSAGE_FIELDS, SECONDARY_TIMESTAMP_FIELD, SERVICE_FIELDS,
    SOURCE_FIELDS, TENANT_FIELD,
};

/// Hard upper bound on any page size.
pub const PAGE_SIZE_CAP: u32 = 200;

/// Bucket limit for grouped statistics.
pub const STATS_BUCKET_LIMIT: u32 = 1000;

/// Tenant value that disables tenant filtering.
pub const ALL_TENANTS: &str = "all";

/// Configuration for the [`QueryAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Primary timestamp field (default: `"timestamp"`).
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    /// Maximum page size, 1..=200 (default: 20).
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_timestamp_field() -> String {
    "timestamp".to_string()
}

fn default_max_page_size() -> u32 {
    20
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timestamp_field: default_timestamp_field(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl AdapterConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 || self.max_page_size > PAGE_SIZE_CAP {
            return Err(ConfigError::OutOfRange {
                setting: "max_page_size".to_string(),
                min: 1,
                max: PAGE_SIZE_CAP as u64,
                value: self.max_page_size as u64,
            });
        }
        Ok(())
    }
}

/// A search body ready to be submitted to a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchDsl {
    body: Value,
}

impl SearchDsl {
    /// Wraps a raw body.
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// Returns the body.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes the DSL, returning the body.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Returns the requested number of hits.
    pub fn size(&self) -> u64 {
        self.body.get("size").and_then(Value::as_u64).unwrap_or(0)
    }

    /// Returns the sort clauses.
    pub fn sort(&self) -> &[Value] {
        self.body
            .get("sort")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Translates structured requests into search bodies.
#[derive(Debug, Clone, Default)]
pub struct QueryAdapter {
    config: AdapterConfig,
}

impl QueryAdapter {
    /// Creates an adapter.
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Returns the configured primary timestamp field.
    pub fn timestamp_field(&self) -> &str {
        &self.config.timestamp_field
    }

    /// Returns the effective page size for a request: `[1, max]` with the
    /// configured maximum itself capped at 200.
    pub fn page_size(&self, spec: &SearchRequestSpec) -> u64 {
        let max = self.config.max_page_size.min(PAGE_SIZE_CAP) as i64;
        spec.pagination.page_size.min(max).max(1) as u64
    }

    /// Returns the effective 1-based page number.
    pub fn page(&self, spec: &SearchRequestSpec) -> u64 {
        spec.pagination.page.max(1) as u64
    }

    /// Builds the search body for a request.
    pub fn build(&self, spec: &SearchRequestSpec) -> SearchDsl {
        let size = self.page_size(spec);
        let from = (self.page(spec) - 1).saturating_mul(size);

        let mut body = json!({
            "size": size,
            "sort": self.build_sort(spec),
            "query": self.build_query(&spec.tenant_id, &spec.time_range, &spec.filters),
        });

        match spec.mode {
            PaginationMode::Cursor => {
                if let Some(search_after) = spec.cursor.as_ref().and_then(|c| c.sort_values()) {
                    body["search_after"] = json!(search_after);
                }
            }
            PaginationMode::Page => {
                body["from"] = json!(from);
            }
        }

        body["_source"] = json!({ "includes": self.source_includes() });

        SearchDsl::new(body)
    }

    /// Builds a body that only counts matches: no hits, no offset, no cursor.
    pub fn count_only(&self, spec: &SearchRequestSpec) -> SearchDsl {
        let mut body = self.build(spec).into_body();
        if let Some(map) = body.as_object_mut() {
            map.remove("from");
            map.remove("search_after");
        }
        body["size"] = json!(0);
        body["track_total_hits"] = json!(true);
        SearchDsl::new(body)
    }

    /// Builds a grouped-count body over a time window.
    pub fn build_stats(&self, tenant_id: &str, time_range: &TimeRange, group_by: GroupBy) -> SearchDsl {
        let body = json!({
            "size": 0,
            "query": self.build_query(tenant_id, time_range, &LogFilters::default()),
            "aggs": {
                GROUP_STATS_AGG: {
                    "terms": { "field": group_by.field(), "size": STATS_BUCKET_LIMIT }
                }
            }
        });
        SearchDsl::new(body)
    }

    fn build_query(&self, tenant_id: &str, time_range: &TimeRange, filters: &LogFilters) -> Value {
        let mut must_clauses: Vec<Value> = Vec::new();
        let mut filter_clauses: Vec<Value> = Vec::new();

        let tenant_id = tenant_id.trim();
        if !tenant_id.is_empty() && !tenant_id.eq_ignore_ascii_case(ALL_TENANTS) {
            filter_clauses.push(json!({ "term": { TENANT_FIELD: tenant_id } }));
        }

        if let Some((start, end)) = time_range.bounds() {
            let should: Vec<Value> = self
                .timestamp_fields()
                .into_iter()
                .map(|field| json!({ "range": { field: { "gte": start, "lte": end } } }))
                .collect();
            filter_clauses.push(any_of(should));
        }

        if !filters.level.is_empty() {
            let should = LEVEL_FIELDS
                .iter()
                .map(|field| json!({ "terms": { *field: filters.level } }))
                .collect();
            filter_clauses.push(any_of(should));
        }

        let services = service_variants(&filters.service);
        if !services.is_empty() {
            let should = SERVICE_FIELDS
                .iter()
                .map(|field| json!({ "terms": { *field: services } }))
                .collect();
            filter_clauses.push(any_of(should));
        }

        if let Some(keyword) = filters.keyword() {
            must_clauses.push(json!({
                "multi_match": {
                    "query": keyword,
                    "fields": MESSAGE_FIELDS,
                    "type": "best_fields",
                }
            }));
        }

        json!({
            "bool": {
                "must": must_clauses,
                "filter": filter_clauses,
            }
        })
    }

    /// Two-level sort: requested field, then the document id ascending.
    fn build_sort(&self, spec: &SearchRequestSpec) -> Value {
        let field = spec
            .sort
            .field
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.config.timestamp_field);
        let order = spec.sort.order.as_str();

        json!([
            { field: { "order": order } },
            { ID_FIELD: { "order": SortOrder::Asc.as_str() } },
        ])
    }

    fn timestamp_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.config.timestamp_field.as_str()];
        if self.config.timestamp_field != SECONDARY_TIMESTAMP_FIELD {
            fields.push(SECONDARY_TIMESTAMP_FIELD);
        }
        fields
    }

    fn source_includes(&self) -> Vec<&str> {
        let mut includes: BTreeSet<&str> = SOURCE_FIELDS.into_iter().collect();
        includes.insert(self.config.timestamp_field.as_str());
        includes.into_iter().collect()
    }
}

fn any_of(should: Vec<Value>) -> Value {
    json!({
        "bool": {
            "should": should,
            "minimum_should_match": 1,
        }
    })
}

/// Expands service names into hyphen/underscore variants, sorted and
/// deduplicated. Blank names are dropped.
pub fn service_variants(services: &[String]) -> Vec<String> {
    let mut variants = BTreeSet::new();
    for service in services.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        variants.insert(service.to_string());
        variants.insert(service.replace('-', "_"));
        variants.insert(service.replace('_', "-"));
    }
    variants.into_iter().collect()
}
