//! Structured log-search requests.
//!
//! These types are produced by the caller-facing layer and consumed by the
//! query adapter. Deserialization is deliberately lenient: a missing or `null`
//! optional field takes its default, and unrecognised sort orders or
//! pagination modes fall back to `desc` and `page`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::cursor::CursorToken;

/// Default page number.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size before clamping.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Deserializes `null` as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A structured log-search request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequestSpec {
    /// Tenant identifier; the literal `all` (any case) disables tenant filtering.
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_id: String,

    /// Requested page.
    #[serde(default, deserialize_with = "nullable")]
    pub pagination: PageRequest,

    /// Time window; only applied when both ends are present.
    #[serde(default, deserialize_with = "nullable")]
    pub time_range: TimeRange,

    /// Level, service, and free-text filters.
    #[serde(default, deserialize_with = "nullable")]
    pub filters: LogFilters,

    /// Requested primary sort.
    #[serde(default, deserialize_with = "nullable")]
    pub sort: SortSpec,

    /// Offset or cursor pagination.
    #[serde(default, deserialize_with = "nullable")]
    pub mode: PaginationMode,

    /// Position to continue from in cursor mode.
    #[serde(default, alias = "cursor_after", skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,
}

impl SearchRequestSpec {
    /// Creates a request for a tenant with all other fields defaulted.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Default::default()
        }
    }

    /// Sets the page and page size.
    pub fn with_page(mut self, page: i64, page_size: i64) -> Self {
        self.pagination = PageRequest { page, page_size };
        self
    }

    /// Sets the time range.
    pub fn with_time_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.time_range = TimeRange {
            start: Some(start.into()),
            end: Some(end.into()),
        };
        self
    }

    /// Sets the filters.
    pub fn with_filters(mut self, filters: LogFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the primary sort.
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = SortSpec {
            field: Some(field.into()),
            order,
        };
        self
    }

    /// Switches to cursor mode, optionally continuing from a position.
    pub fn with_cursor(mut self, cursor: Option<CursorPosition>) -> Self {
        self.mode = PaginationMode::Cursor;
        self.cursor = cursor;
        self
    }
}

/// Page number and size as supplied by the caller, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Requested number of hits per page.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A caller-supplied time window. Chronological order is not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    #[serde(default)]
    pub start: Option<String>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub end: Option<String>,
}

impl TimeRange {
    /// Returns both bounds when both are present and non-blank.
    pub fn bounds(&self) -> Option<(&str, &str)> {
        let start = self.start.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let end = self.end.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((start, end))
    }
}

/// Structured filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilters {
    /// Accepted log levels.
    #[serde(default, alias = "loglevel", deserialize_with = "nullable")]
    pub level: Vec<String>,
    /// Accepted service names.
    #[serde(default, deserialize_with = "nullable")]
    pub service: Vec<String>,
    /// Free-text term matched against message fields.
    #[serde(default)]
    pub keyword: Option<String>,
}

impl LogFilters {
    /// Returns the keyword when it is non-blank.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// The caller's primary sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field to sort on; defaults to the configured timestamp field.
    #[serde(default)]
    pub field: Option<String>,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns the DSL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Parses a direction; anything other than `asc` is descending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(SortOrder::parse).unwrap_or_default())
    }
}

/// Pagination strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// Numeric offset pagination.
    #[default]
    Page,
    /// `search_after` continuation from an opaque position.
    Cursor,
}

impl PaginationMode {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaginationMode::Page => "page",
            PaginationMode::Cursor => "cursor",
        }
    }
}

impl Serialize for PaginationMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaginationMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some(mode) if mode.eq_ignore_ascii_case("cursor") => PaginationMode::Cursor,
            _ => PaginationMode::Page,
        })
    }
}

/// A continuation position, either an opaque token or raw sort values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorPosition {
    /// An encoded [`CursorToken`].
    Token(String),
    /// The raw `sort` array of the previous page's last hit.
    Values(Vec<Value>),
}

impl CursorPosition {
    /// Resolves the position to `search_after` values.
    ///
    /// Returns `None` for undecodable tokens and empty arrays.
    pub fn sort_values(&self) -> Option<Vec<Value>> {
        match self {
            CursorPosition::Token(token) => CursorToken::decode(token)
                .ok()
                .map(CursorToken::into_sort_values),
            CursorPosition::Values(values) if !values.is_empty() => Some(values.clone()),
            CursorPosition::Values(_) => None,
        }
    }
}

/// How a request picks its target indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTarget {
    /// Keyword looked up in the index catalog.
    #[serde(default)]
    pub index_keyword: Option<String>,
    /// Treat the keyword as a regular expression.
    #[serde(default, deserialize_with = "nullable")]
    pub use_regex: bool,
    /// Explicit index list, bypassing the catalog.
    #[serde(default, deserialize_with = "nullable")]
    pub override_indexes: Vec<String>,
}

/// A search request plus its index selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogQueryRequest {
    /// The structured search.
    #[serde(flatten)]
    pub spec: SearchRequestSpec,
    /// Target index selection.
    #[serde(flatten)]
    pub target: IndexTarget,
}

impl LogQueryRequest {
    /// Creates a request from a search spec with the default index selection.
    pub fn new(spec: SearchRequestSpec) -> Self {
        Self {
            spec,
            target: IndexTarget::default(),
        }
    }

    /// Sets the index selection.
    pub fn with_target(mut self, target: IndexTarget) -> Self {
        self.target = target;
        self
    }
}

/// Field a statistics request groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Group by service.
    Service,
    /// Group by level.
    Level,
    /// Group by host.
    Host,
}

impl GroupBy {
    /// Returns the document field aggregated on.
    pub fn field(&self) -> &'static str {
        match self {
            GroupBy::Service => "service",
            GroupBy::Level => "level",
            GroupBy::Host => "host",
        }
    }
}

/// A grouped-count request over a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRequest {
    /// Tenant identifier.
    #[serde(default, deserialize_with = "nullable")]
    pub tenant_id: String,
    /// Time window.
    #[serde(default, deserialize_with = "nullable")]
    pub time_range: TimeRange,
    /// Grouping field.
    pub group_by: GroupBy,
    /// Target index selection.
    #[serde(flatten)]
    pub target: IndexTarget,
}
