//! Immutable route and intent registry.
//!
//! Built once at wiring time by [`crate::dispatcher::add_router`] and shared
//! read-only across all turns and sessions, so no locking is needed on the
//! dispatch path.

use crate::host::{IntentSchema, RouteHandler, TurnRequest, TurnResponse};
use crate::matcher::RoutePattern;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// An `(intentName, schema?)` pair forwarded verbatim to the host framework.
#[derive(Debug, Clone)]
pub struct IntentRegistration {
    pub name: String,
    pub schema: Option<IntentSchema>,
}

/// Declaration-ordered table of route patterns and their handlers.
///
/// Order matters: when two patterns score equally against a route string, the
/// one declared first wins.
///
/// ```
/// use turnrouter::registry::RouteTable;
///
/// let routes = RouteTable::new()
///     .route("/help", |_req, _res| { /* speak help */ })
///     .route("/test/{testId}", |_req, _res| { /* examine the test */ });
/// ```
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<(RoutePattern, RouteHandler)>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Declaring the same pattern twice replaces the handler
    /// but keeps the pattern's original tie-break position.
    #[must_use]
    pub fn route<F>(mut self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&mut TurnRequest, &mut TurnResponse) + Send + Sync + 'static,
    {
        let handler: RouteHandler = Arc::new(handler);
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| p.as_str() == pattern) {
            warn!(route = %pattern, "Replaced existing route handler");
            entry.1 = handler;
        } else {
            self.entries.push((RoutePattern::parse(pattern), handler));
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The route table, per-intent default routes, and intent registrations,
/// frozen at wiring time.
pub struct RouteRegistry {
    routes: Vec<(RoutePattern, RouteHandler)>,
    default_routes: HashMap<String, String>,
    intents: Vec<IntentRegistration>,
}

impl RouteRegistry {
    pub(crate) fn new(
        table: RouteTable,
        default_routes: HashMap<String, String>,
        intents: Vec<IntentRegistration>,
    ) -> Self {
        info!(
            routes_count = table.entries.len(),
            default_routes_count = default_routes.len(),
            intents_count = intents.len(),
            "Route registry loaded"
        );
        Self {
            routes: table.entries,
            default_routes,
            intents,
        }
    }

    /// Compiled patterns in declaration order.
    pub fn patterns(&self) -> impl Iterator<Item = &RoutePattern> {
        self.routes.iter().map(|(pattern, _)| pattern)
    }

    /// Handler bound to a pattern string, if any.
    #[must_use]
    pub fn handler_for(&self, pattern: &str) -> Option<&RouteHandler> {
        self.routes
            .iter()
            .find(|(p, _)| p.as_str() == pattern)
            .map(|(_, handler)| handler)
    }

    /// Fallback route for an intent with no pending session route.
    #[must_use]
    pub fn default_route(&self, intent: &str) -> Option<&str> {
        self.default_routes.get(intent).map(String::as_str)
    }

    /// Intent registrations to forward to the host framework.
    #[must_use]
    pub fn intents(&self) -> &[IntentRegistration] {
        &self.intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_pattern_keeps_position() {
        let table = RouteTable::new()
            .route("/a", |_req, _res| {})
            .route("/b", |_req, _res| {})
            .route("/a", |_req, _res| {});
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries[0].0.as_str(), "/a");
        assert_eq!(table.entries[1].0.as_str(), "/b");
    }

    #[test]
    fn test_handler_lookup_by_pattern_string() {
        let registry = RouteRegistry::new(
            RouteTable::new().route("/help", |_req, _res| {}),
            HashMap::new(),
            Vec::new(),
        );
        assert!(registry.handler_for("/help").is_some());
        assert!(registry.handler_for("/missing").is_none());
    }
}
