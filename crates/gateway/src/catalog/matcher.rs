//! Inclusion rules and keyword lookup over index names.

use regex::{Regex, RegexBuilder};

use crate::error::CatalogError;

/// Compiled include/exclude rules.
///
/// Patterns are searched anywhere in the name, not matched against the whole
/// name; anchor them with `^`/`$` where needed.
#[derive(Debug, Clone)]
pub struct IndexPatterns {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl IndexPatterns {
    /// Compiles the rules, failing on the first invalid pattern.
    pub fn compile(include: &[String], exclude: &[String]) -> Result<Self, CatalogError> {
        Ok(Self {
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
        })
    }

    /// Returns true if the name belongs in the catalog.
    ///
    /// Empty names never do. Any exclude match rejects. Otherwise the name is
    /// accepted when no include patterns exist or at least one matches.
    pub fn is_valid(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        if self.exclude.iter().any(|re| re.is_match(name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(name))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, CatalogError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| CatalogError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Looks up `keyword` in sorted candidate names.
///
/// An empty keyword returns every candidate. With `use_regex` the keyword is
/// a case-insensitive regex; otherwise it is a case-insensitive substring.
/// When that finds nothing, `fuzzy` is set, and `use_regex` is not, the
/// keyword is split on non-alphanumeric characters and any candidate
/// containing any of the pieces matches.
pub fn find_matches<'a, I>(
    candidates: I,
    keyword: &str,
    use_regex: bool,
    fuzzy: bool,
) -> Result<Vec<String>, CatalogError>
where
    I: IntoIterator<Item = &'a String>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();
    if keyword.is_empty() {
        return Ok(candidates.cloned().collect());
    }

    let mut matches: Vec<String> = if use_regex {
        let pattern = RegexBuilder::new(keyword)
            .case_insensitive(true)
            .build()
            .map_err(|e| CatalogError::InvalidPattern {
                pattern: keyword.to_string(),
                message: e.to_string(),
            })?;
        candidates
            .clone()
            .filter(|name| pattern.is_match(name))
            .cloned()
            .collect()
    } else {
        let needle = keyword.to_lowercase();
        candidates
            .clone()
            .filter(|name| name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    };

    if matches.is_empty() && fuzzy && !use_regex {
        let parts: Vec<String> = keyword
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect();
        matches = candidates
            .filter(|name| {
                let lower = name.to_lowercase();
                parts.iter().any(|part| lower.contains(part.as_str()))
            })
            .cloned()
            .collect();
    }

    Ok(matches)
}
