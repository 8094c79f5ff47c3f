//! Typed session-carried route state.
//!
//! A handler selects the next turn's routes by storing a [`SessionRouteMap`]
//! in the host's session attributes under [`ROUTE_ATTRIBUTE`]. The dispatch
//! interceptor consumes and deletes the stored map at the start of the next
//! turn, before any matching happens, so a record is read at most once.
//!
//! Serialization format: a JSON object mapping intent names to route strings
//! (`{"TestIntent": "/test/123?x=1"}`). Anything else stored under the key is
//! treated as absent, never as an error, so a corrupted session self-heals on
//! the next turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Reserved session attribute key holding the pending route map.
pub const ROUTE_ATTRIBUTE: &str = "route";

/// Mapping from intent name to the route string that intent should resolve to
/// on the next conversational turn.
///
/// Route strings may carry their own query component, e.g. `/test/123?x=1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRouteMap {
    next: HashMap<String, String>,
}

impl SessionRouteMap {
    /// Create an empty route map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```
    /// use turnrouter::session::SessionRouteMap;
    ///
    /// let next = SessionRouteMap::new()
    ///     .with("YesIntent", "/purchase/confirm")
    ///     .with("NoIntent", "/purchase/cancel");
    /// assert_eq!(next.get("YesIntent"), Some("/purchase/confirm"));
    /// ```
    #[must_use]
    pub fn with(mut self, intent: impl Into<String>, route: impl Into<String>) -> Self {
        self.next.insert(intent.into(), route.into());
        self
    }

    /// Insert or replace the route for an intent name.
    pub fn insert(&mut self, intent: impl Into<String>, route: impl Into<String>) {
        self.next.insert(intent.into(), route.into());
    }

    /// Route string recorded for an intent name, if any.
    #[must_use]
    pub fn get(&self, intent: &str) -> Option<&str> {
        self.next.get(intent).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.next.len()
    }

    /// Decode a stored session attribute value.
    ///
    /// Returns `None` for `null` or any value that is not an object of
    /// strings; a malformed value is logged and dropped rather than surfaced
    /// as an error.
    #[must_use]
    pub fn from_attr(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(map) => Some(map),
            Err(err) => {
                warn!(error = %err, "Malformed session route map; treating as absent");
                None
            }
        }
    }

    /// Encode for storage as a session attribute value.
    #[must_use]
    pub fn to_attr(&self) -> Value {
        // A map of strings cannot fail to serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<HashMap<String, String>> for SessionRouteMap {
    fn from(next: HashMap<String, String>) -> Self {
        Self { next }
    }
}

impl FromIterator<(String, String)> for SessionRouteMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            next: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trips_through_attribute_value() {
        let map = SessionRouteMap::new().with("TestIntent", "/help");
        let value = map.to_attr();
        assert_eq!(value, json!({"TestIntent": "/help"}));
        assert_eq!(SessionRouteMap::from_attr(&value), Some(map));
    }

    #[test]
    fn test_null_attribute_is_absent() {
        assert_eq!(SessionRouteMap::from_attr(&Value::Null), None);
    }

    #[test]
    fn test_malformed_attribute_is_dropped() {
        assert_eq!(SessionRouteMap::from_attr(&json!("not a map")), None);
        assert_eq!(SessionRouteMap::from_attr(&json!({"a": 1})), None);
    }

    #[test]
    fn test_route_strings_keep_query_component() {
        let map = SessionRouteMap::new().with("TestIntent", "/test/123?x=1");
        assert_eq!(map.get("TestIntent"), Some("/test/123?x=1"));
    }
}
