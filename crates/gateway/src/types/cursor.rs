//! Opaque cursor tokens for `search_after` continuation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// An opaque position in a deterministically sorted result set.
///
/// The token carries the `sort` values of the last hit of a page, in sort
/// order, the final value being the document-id tie-break. Clients treat the
/// encoded form as opaque and hand it back unchanged to fetch the next page.
///
/// # Encoding
///
/// URL-safe base64 (no padding) over the JSON array of sort values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorToken {
    sort_values: Vec<Value>,
}

impl CursorToken {
    /// Creates a token from the sort values of a hit.
    pub fn new(sort_values: Vec<Value>) -> Self {
        Self { sort_values }
    }

    /// Builds a token from a raw search hit, if the hit carries sort values.
    pub fn from_hit(hit: &Value) -> Option<Self> {
        hit.get("sort")
            .and_then(Value::as_array)
            .filter(|values| !values.is_empty())
            .map(|values| Self::new(values.clone()))
    }

    /// Returns the sort values.
    pub fn sort_values(&self) -> &[Value] {
        &self.sort_values
    }

    /// Consumes the token, returning the sort values.
    pub fn into_sort_values(self) -> Vec<Value> {
        self.sort_values
    }

    /// Encodes the token to an opaque string.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(&self.sort_values).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a token from an opaque string.
    pub fn decode(s: &str) -> Result<Self, QueryError> {
        let invalid = || QueryError::InvalidCursor {
            cursor: s.to_string(),
        };

        let bytes = URL_SAFE_NO_PAD.decode(s.trim()).map_err(|_| invalid())?;
        let sort_values: Vec<Value> = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
        if sort_values.is_empty() {
            return Err(invalid());
        }
        Ok(Self { sort_values })
    }
}
