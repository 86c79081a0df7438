//! Server version handling and version-dependent path shaping.
//!
//! Releases up to and including 6.x still address documents through a mapping
//! type (`{index}/{type}/...`); later releases removed types. The path is
//! chosen from the detected major version and whether the caller supplied a
//! document type at all.
//!
//! Every index, type and id segment is percent-encoded before it is placed in
//! a path, so a name can never reach past its own segment.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters encoded inside a path segment. `,` and `*` pass through so
/// index lists and wildcards keep their meaning.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Highest major version that still uses typed paths.
pub const LEGACY_MAX_MAJOR: u32 = 6;

/// Major version assumed when detection fails.
pub const FALLBACK_MAJOR: u32 = 6;

/// Version number assumed when the root endpoint omits `version.number`.
pub const DEFAULT_VERSION_NUMBER: &str = "6.5.4";

/// The major version of a cluster, detected once per connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedVersion {
    major: u32,
}

impl DetectedVersion {
    /// Creates a version from a major number.
    pub const fn new(major: u32) -> Self {
        Self { major }
    }

    /// The conservative fallback used when probing fails.
    pub const fn fallback() -> Self {
        Self::new(FALLBACK_MAJOR)
    }

    /// Parses a version string such as `7.17.3`, taking the integer before the
    /// first dot. Returns `None` when that prefix is not an integer.
    pub fn parse(number: &str) -> Option<Self> {
        number
            .trim()
            .split('.')
            .next()
            .and_then(|major| major.parse::<u32>().ok())
            .map(Self::new)
    }

    /// Returns the major version.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Returns true if typed paths apply for this document type.
    pub fn uses_typed_paths(&self, doc_type: Option<&str>) -> bool {
        self.major <= LEGACY_MAX_MAJOR && doc_type.is_some_and(|t| !t.is_empty())
    }

    /// Returns the path to submit a search to.
    ///
    /// Each index name is encoded separately and the names are joined with
    /// `,`. An empty list yields the cluster-wide `/_search`; callers are
    /// expected to resolve at least one index first.
    pub fn search_path(&self, indices: &[String], doc_type: Option<&str>) -> String {
        let target = indices
            .iter()
            .map(|index| encode_segment(index))
            .collect::<Vec<_>>()
            .join(",");
        let prefix = if target.is_empty() {
            String::new()
        } else {
            format!("/{target}")
        };

        match doc_type {
            Some(doc_type) if self.uses_typed_paths(Some(doc_type)) => {
                format!("{prefix}/{}/_search", encode_segment(doc_type))
            }
            _ => format!("{prefix}/_search"),
        }
    }

    /// Returns the path of a single document.
    pub fn document_path(&self, index: &str, doc_id: &str, doc_type: Option<&str>) -> String {
        let index = encode_segment(index);
        let doc_id = encode_segment(doc_id);
        match doc_type {
            Some(doc_type) if self.uses_typed_paths(Some(doc_type)) => {
                format!("/{index}/{}/{doc_id}", encode_segment(doc_type))
            }
            _ => format!("/{index}/_doc/{doc_id}"),
        }
    }
}

impl Default for DetectedVersion {
    fn default() -> Self {
        Self::fallback()
    }
}
