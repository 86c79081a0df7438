//! Field names searched by the adapter.
//!
//! Log producers disagree on field naming, so most filters fan out over
//! several candidate paths.

/// Secondary timestamp field matched alongside the configured one.
pub const SECONDARY_TIMESTAMP_FIELD: &str = "@timestamp";

/// Tertiary timestamp field used only when merging.
pub const TERTIARY_TIMESTAMP_FIELD: &str = "timestamp";

/// Field holding the tenant identifier.
pub const TENANT_FIELD: &str = "tenant_id";

/// Document id, used as the sort tie-break.
pub const ID_FIELD: &str = "_id";

/// Level field candidates, keyword sub-fields first.
pub const LEVEL_FIELDS: [&str; 4] = ["loglevel.keyword", "level.keyword", "loglevel", "level"];

/// Service field candidates.
pub const SERVICE_FIELDS: [&str; 6] = [
    "type.keyword",
    "type",
    "service.keyword",
    "service",
    "fields.service.keyword",
    "fields.service",
];

/// Fields searched by the free-text keyword.
pub const MESSAGE_FIELDS: [&str; 2] = ["message", "logmessage"];

/// Source fields returned besides the configured timestamp field.
pub const SOURCE_FIELDS: [&str; 10] = [
    "@timestamp",
    "timestamp",
    "level",
    "loglevel",
    "message",
    "log",
    "service",
    "tenant_id",
    "host",
    "fields.service",
];
