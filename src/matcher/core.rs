//! Matcher core module - hot path for route resolution.
//!
//! Route resolution runs once per conversational turn, so the matcher keeps
//! parameter extraction on the stack (`SmallVec`) and performs no I/O. The
//! matcher is a pure function over its inputs: identical inputs always yield
//! structurally identical results.

use serde::Serialize;
use smallvec::SmallVec;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
/// Conversational route templates rarely carry more than a couple of
/// placeholders (e.g., `/order/{orderId}/confirm`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the match hot path.
pub type ParamVec = SmallVec<[(String, String); MAX_INLINE_PARAMS]>;

/// Per-segment match contributions, leftmost segment first. Compared
/// lexicographically, which on equal-length keys is exactly the "binary
/// number with the leftmost segment as the most significant bit" ordering.
type SpecificityKey = SmallVec<[u8; 16]>;

/// One segment of a compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the request segment exactly.
    Literal(String),
    /// `{name}` placeholder: binds the request segment as a parameter.
    Param(String),
}

/// A compiled `/`-delimited route template.
///
/// Segments are either literals or `{name}` placeholders. The segment count
/// is fixed at parse time; a request path only matches a pattern with the
/// same segment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a route template into its segment list.
    ///
    /// # Example
    ///
    /// ```
    /// use turnrouter::matcher::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/test/{testId}");
    /// assert_eq!(pattern.as_str(), "/test/{testId}");
    /// assert_eq!(pattern.segment_count(), 3); // "", "test", "{testId}"
    /// ```
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|segment| {
                if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 1 {
                    let name = segment
                        .trim_start_matches('{')
                        .trim_end_matches('}')
                        .to_string();
                    Segment::Param(name)
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The original template string this pattern was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of `/`-separated segments, including the empty leading segment
    /// of a pattern starting with `/`.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Score this pattern against a request path split into segments.
    ///
    /// Returns the specificity key (1 per exact literal, 0 per placeholder,
    /// leftmost first) and the bound parameters, or `None` when the segment
    /// counts differ or a literal segment disagrees. No partial credit.
    fn score(&self, path_segments: &[&str]) -> Option<(SpecificityKey, ParamVec)> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut key = SpecificityKey::new();
        let mut params = ParamVec::new();
        for (segment, part) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Param(name) => {
                    params.push((name.clone(), (*part).to_string()));
                    key.push(0);
                }
                Segment::Literal(lit) if lit == part => key.push(1),
                Segment::Literal(_) => return None,
            }
        }
        Some((key, params))
    }
}

/// A query-string value: a scalar for a key seen once, an ordered list for a
/// key seen multiple times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First value in appearance order.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            QueryValue::One(value) => value,
            QueryValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in appearance order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            QueryValue::One(value) => vec![value.as_str()],
            QueryValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::One(first) => {
                let first = std::mem::take(first);
                *self = QueryValue::Many(vec![first, value]);
            }
            QueryValue::Many(values) => values.push(value),
        }
    }
}

/// Parsed query-string parameters keyed by name.
pub type QueryMap = HashMap<String, QueryValue>;

/// Result of successfully resolving a route string against a route table.
///
/// Produced fresh per conversational turn and attached to that turn's request
/// for handler introspection; never persisted across turns.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    /// The matched pattern string as declared in the route table.
    pub route: String,
    /// Path parameters bound by `{name}` placeholders.
    pub params: ParamVec,
    /// Query string parameters (scalar or list per key).
    pub query: QueryMap,
    /// The raw input string the route was resolved from.
    pub url: String,
}

impl ResolvedRoute {
    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics for duplicate placeholder names at
    /// different path depths.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name.
    #[inline]
    #[must_use]
    pub fn get_query(&self, name: &str) -> Option<&QueryValue> {
        self.query.get(name)
    }

    /// Convert params to a `HashMap` for compatibility.
    /// Note: this allocates - use `get_param()` in hot paths instead.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Parse a query string into a [`QueryMap`].
///
/// Keys and values are percent-decoded. A key appearing once maps to a
/// scalar; a repeated key collects all of its values in appearance order.
fn parse_query(query: &str) -> QueryMap {
    let mut map = QueryMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match map.entry(key.into_owned()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value.into_owned()),
            Entry::Vacant(entry) => {
                entry.insert(QueryValue::One(value.into_owned()));
            }
        }
    }
    map
}

/// Resolve a route string against a table of patterns.
///
/// Splits the input into path and query at the first `?`, scores every
/// pattern with a matching segment count, and selects the candidate with the
/// highest specificity (more exact segments, and earlier exact segments,
/// outrank placeholders). Ties resolve to the pattern declared first in the
/// table, deterministically.
///
/// Pure and idempotent: no I/O, no mutation, identical inputs give
/// structurally identical results.
///
/// # Example
///
/// ```
/// use turnrouter::matcher::{resolve_route, RoutePattern};
///
/// let patterns = [
///     RoutePattern::parse("/test"),
///     RoutePattern::parse("/test/{testId}"),
/// ];
/// let resolved = resolve_route("/test/123?parameter=456", patterns.iter()).unwrap();
/// assert_eq!(resolved.route, "/test/{testId}");
/// assert_eq!(resolved.get_param("testId"), Some("123"));
/// assert_eq!(resolved.get_query("parameter").unwrap().first(), "456");
/// ```
pub fn resolve_route<'a, I>(url: &str, patterns: I) -> Option<ResolvedRoute>
where
    I: IntoIterator<Item = &'a RoutePattern>,
{
    let (path, query_str) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };
    // Keep the empty leading segment: patterns are authored with a leading
    // `/` and split the same way.
    let path_segments: Vec<&str> = path.split('/').collect();

    debug!(url = %url, path = %path, "Route match attempt");

    let mut best: Option<(SpecificityKey, ParamVec, &RoutePattern)> = None;
    for pattern in patterns {
        if let Some((key, params)) = pattern.score(&path_segments) {
            // Strictly-greater keeps the first-declared pattern on ties.
            let better = best.as_ref().map_or(true, |(best_key, _, _)| key > *best_key);
            if better {
                best = Some((key, params, pattern));
            }
        }
    }

    match best {
        Some((_, params, pattern)) => {
            let query = query_str.map(parse_query).unwrap_or_default();
            info!(
                url = %url,
                route = %pattern.as_str(),
                params = ?params,
                "Route matched"
            );
            Some(ResolvedRoute {
                route: pattern.as_str().to_string(),
                params,
                query,
                url: url.to_string(),
            })
        }
        None => {
            warn!(url = %url, "No route matched");
            None
        }
    }
}
