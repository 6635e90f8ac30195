//! Sort micro-syntax parsing.
//!
//! The prefix and postfix markers of a [`SortConfiguration`] are combined
//! into one pattern. Patterns are cached process-wide by marker set, so a
//! pattern is only rebuilt when the configuration changes.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use regex_lite::Regex;
use tracing::debug;

use super::SortDirection;
use crate::config::SortConfiguration;
use crate::error::{SiftError, SiftResult};

/// Upper bound on distinct marker sets kept in the pattern cache.
const MAX_PATTERNS: usize = 64;

/// The four marker lists a sort pattern is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MarkerSet {
    ascending_prefixes: Vec<String>,
    descending_prefixes: Vec<String>,
    ascending_postfixes: Vec<String>,
    descending_postfixes: Vec<String>,
}

impl MarkerSet {
    fn of(config: &SortConfiguration) -> Self {
        Self {
            ascending_prefixes: config.ascending_prefixes.clone(),
            descending_prefixes: config.descending_prefixes.clone(),
            ascending_postfixes: config.ascending_postfixes.clone(),
            descending_postfixes: config.descending_postfixes.clone(),
        }
    }
}

type PatternCache = RwLock<HashMap<MarkerSet, Arc<Regex>>>;

fn cache() -> &'static PatternCache {
    static CACHE: OnceLock<PatternCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

fn alternation(markers: &[String]) -> Option<String> {
    let mut markers: Vec<&String> = markers.iter().filter(|m| !m.is_empty()).collect();
    if markers.is_empty() {
        return None;
    }
    markers.sort_by(|a, b| b.len().cmp(&a.len()));
    Some(
        markers
            .iter()
            .map(|m| regex_lite::escape(m))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn group(name: &str, markers: &[String]) -> Option<String> {
    alternation(markers).map(|alt| format!("(?P<{}>{})", name, alt))
}

fn build_pattern(config: &SortConfiguration) -> SiftResult<Regex> {
    let prefixes: Vec<String> = [
        group("asc_pre", &config.ascending_prefixes),
        group("desc_pre", &config.descending_prefixes),
    ]
    .into_iter()
    .flatten()
    .collect();
    let postfixes: Vec<String> = [
        group("asc_post", &config.ascending_postfixes),
        group("desc_post", &config.descending_postfixes),
    ]
    .into_iter()
    .flatten()
    .collect();

    let optional = |groups: Vec<String>| {
        if groups.is_empty() {
            String::new()
        } else {
            format!("(?:{})?", groups.join("|"))
        }
    };

    let pattern = format!(
        "(?i)^{}(?P<path>.*?){}$",
        optional(prefixes),
        optional(postfixes)
    );

    Regex::new(&pattern).map_err(|e| {
        SiftError::invalid_configuration(format!("sort markers do not form a valid pattern: {}", pattern))
            .with_source(e)
    })
}

fn pattern_for(config: &SortConfiguration) -> SiftResult<Arc<Regex>> {
    let key = MarkerSet::of(config);
    if let Some(pattern) = cache().read().get(&key) {
        return Ok(Arc::clone(pattern));
    }

    let pattern = Arc::new(build_pattern(config)?);
    let mut cache = cache().write();
    insert_bounded(&mut cache, key, Arc::clone(&pattern));
    debug!(patterns = cache.len(), "Built sort pattern");
    Ok(pattern)
}

fn insert_bounded(cache: &mut HashMap<MarkerSet, Arc<Regex>>, key: MarkerSet, pattern: Arc<Regex>) {
    if cache.len() >= MAX_PATTERNS && !cache.contains_key(&key) {
        if let Some(evicted) = cache.keys().next().cloned() {
            cache.remove(&evicted);
            debug!("Sort pattern cache evicted entry");
        }
    }
    cache.insert(key, pattern);
}

/// Split raw sort syntax into (property path, direction) pairs.
///
/// Tokens are separated by commas; empty tokens and tokens without a path
/// are skipped. Paths are not resolved against any model here.
pub fn parse_sort_syntax(
    raw: &str,
    config: &SortConfiguration,
) -> SiftResult<Vec<(String, SortDirection)>> {
    let pattern = pattern_for(config)?;

    let mut sorts = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some(caps) = pattern.captures(token) else {
            continue;
        };
        let path = caps.name("path").map_or("", |m| m.as_str()).trim();
        if path.is_empty() {
            continue;
        }

        let descending = caps.name("desc_pre").is_some() || caps.name("desc_post").is_some();
        let direction = if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        sorts.push((path.to_string(), direction));
    }
    Ok(sorts)
}
