//! Merging of per-cluster responses.

use std::collections::HashMap;

use serde_json::Value;

use crate::query::fields::{SECONDARY_TIMESTAMP_FIELD, TERTIARY_TIMESTAMP_FIELD};
use crate::types::{AggregationBucket, MergedResult, response_hits, response_total};

/// Returns the value a hit is ordered by when merging.
///
/// Falls back from the configured timestamp field to `@timestamp`, then
/// `timestamp`, then the first sort value. A hit with none of them gets the
/// empty string and therefore sorts after every timestamped hit.
pub fn merge_key(hit: &Value, timestamp_field: &str) -> String {
    let source = hit.get("_source");
    [timestamp_field, SECONDARY_TIMESTAMP_FIELD, TERTIARY_TIMESTAMP_FIELD]
        .iter()
        .filter_map(|field| source.and_then(|s| s.get(*field)))
        .chain(hit.get("sort").and_then(|s| s.get(0)))
        .find_map(key_text)
        .unwrap_or_default()
}

fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Merges successful responses into one result.
///
/// Totals are summed. Hits are concatenated, ordered by [`merge_key`]
/// descending (stable, so equal keys keep cluster order) and cut to `size`.
pub fn merge_responses(responses: &[Value], timestamp_field: &str, size: usize) -> MergedResult {
    let total = responses.iter().map(response_total).sum();

    let mut keyed: Vec<(String, Value)> = responses
        .iter()
        .flat_map(response_hits)
        .map(|hit| (merge_key(&hit, timestamp_field), hit))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.truncate(size);

    MergedResult {
        total,
        hits: keyed.into_iter().map(|(_, hit)| hit).collect(),
        unavailable: Vec::new(),
    }
}

/// Merges bucket lists by key, summing counts.
///
/// The result is ordered by count descending, then key ascending.
pub fn merge_buckets(
    bucket_lists: impl IntoIterator<Item = Vec<AggregationBucket>>,
) -> Vec<AggregationBucket> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for bucket in bucket_lists.into_iter().flatten() {
        *counts.entry(bucket.key).or_insert(0) += bucket.doc_count;
    }

    let mut merged: Vec<AggregationBucket> = counts
        .into_iter()
        .map(|(key, doc_count)| AggregationBucket { key, doc_count })
        .collect();
    merged.sort_by(|a, b| b.doc_count.cmp(&a.doc_count).then_with(|| a.key.cmp(&b.key)));
    merged
}
