//! # Matcher Module
//!
//! The matcher module provides route pattern compilation and route resolution
//! for turnrouter. It scores URL-style route templates against a route string
//! and extracts path and query parameters from the best match.
//!
//! ## Overview
//!
//! The matcher is responsible for:
//! - Compiling route templates (e.g., `/test/{testId}`) into segment lists
//! - Scoring candidate patterns against a request path by specificity
//! - Extracting placeholder parameters from the matched route
//! - Parsing query strings into scalar-or-list values
//!
//! ## Matching Algorithm
//!
//! A pattern is a candidate only when its segment count equals the request
//! path's segment count. Each segment contributes a bit: `1` for an exact
//! literal match, `0` for a placeholder binding. Read leftmost-first as a
//! binary number, the highest value wins; ties resolve to the pattern
//! declared first in the table. A literal mismatch eliminates the candidate
//! outright - there is no partial credit.
//!
//! ## Example
//!
//! ```
//! use turnrouter::matcher::{resolve_route, RoutePattern};
//!
//! let patterns = [
//!     RoutePattern::parse("/help"),
//!     RoutePattern::parse("/test/{testId}"),
//! ];
//!
//! let resolved = resolve_route("/test/123?parameter=456", patterns.iter()).unwrap();
//! assert_eq!(resolved.route, "/test/{testId}");
//! assert_eq!(resolved.get_param("testId"), Some("123"));
//! ```
//!
//! ## Purity
//!
//! Resolution performs no I/O and mutates nothing; it is safe to call from
//! any thread and yields identical results for identical inputs.

mod core;

pub use core::{
    resolve_route, ParamVec, QueryMap, QueryValue, ResolvedRoute, RoutePattern, MAX_INLINE_PARAMS,
};
