//! Query results and helpers for reading raw search responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cursor::CursorToken;

/// Name of the terms aggregation used for grouped statistics.
pub const GROUP_STATS_AGG: &str = "group_stats";

/// The merged outcome of one logical query across every reachable cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    /// Sum of `hits.total` over the clusters that answered.
    pub total: u64,

    /// Raw hits, ordered and capped at the requested size.
    pub hits: Vec<Value>,

    /// Clusters that failed and were excluded from the merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

impl MergedResult {
    /// Builds a result from a single raw response body.
    pub fn from_response(body: &Value) -> Self {
        Self {
            total: response_total(body),
            hits: response_hits(body),
            unavailable: Vec::new(),
        }
    }

    /// Returns a continuation token positioned after the last hit.
    pub fn next_cursor(&self) -> Option<CursorToken> {
        self.hits.last().and_then(CursorToken::from_hit)
    }

    /// Returns true if some clusters did not contribute.
    pub fn is_partial(&self) -> bool {
        !self.unavailable.is_empty()
    }
}

/// One bucket of a grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationBucket {
    /// Group key.
    pub key: String,
    /// Number of documents in the group.
    pub doc_count: u64,
}

/// The merged outcome of a grouped-count query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Buckets ordered by count descending, then key ascending.
    pub buckets: Vec<AggregationBucket>,

    /// Clusters that failed and were excluded from the merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

/// Reads `hits.total` as either `{"value": n}` or a bare integer.
///
/// Anything else counts as zero.
pub fn response_total(body: &Value) -> u64 {
    match body.pointer("/hits/total") {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        Some(total) => total.as_u64().unwrap_or(0),
        None => 0,
    }
}

/// Reads `hits.hits`, or an empty list.
pub fn response_hits(body: &Value) -> Vec<Value> {
    body.pointer("/hits/hits")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Reads the buckets of the `group_stats` aggregation.
///
/// Numeric keys are rendered as strings; buckets without a key are skipped.
pub fn response_buckets(body: &Value) -> Vec<AggregationBucket> {
    let Some(buckets) = body
        .pointer(&format!("/aggregations/{GROUP_STATS_AGG}/buckets"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    buckets
        .iter()
        .filter_map(|bucket| {
            let key = match bucket.get("key")? {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            };
            let doc_count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
            Some(AggregationBucket { key, doc_count })
        })
        .collect()
}
