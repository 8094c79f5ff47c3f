use crate::session::{SessionRouteMap, ROUTE_ATTRIBUTE};
use serde_json::Value;
use std::collections::HashMap;

/// Ordered session-attribute mutation recorded during one turn.
#[derive(Debug, Clone, PartialEq)]
enum SessionOp {
    Set(String, Value),
    Remove(String),
}

/// The outgoing side of one conversational turn.
///
/// Collects the session-attribute writes and the end-of-session decision the
/// host must apply after the turn completes. Hosts must apply the recorded
/// session writes via [`TurnResponse::apply_to`] even when the turn's entry
/// point returns an error: the router clears consumed route state through
/// these writes, and dropping them would let stale state leak into a later
/// turn.
#[derive(Debug, Clone)]
pub struct TurnResponse {
    end_session: bool,
    session_ops: Vec<SessionOp>,
}

impl Default for TurnResponse {
    fn default() -> Self {
        // Voice sessions close after a turn unless something holds them open.
        Self {
            end_session: true,
            session_ops: Vec::new(),
        }
    }
}

impl TurnResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the routes future intents should resolve to on the next turn.
    ///
    /// Atomically marks the conversation as continuing (the session must not
    /// end for a next turn to exist) and stores the map under
    /// [`ROUTE_ATTRIBUTE`] for the host to persist.
    ///
    /// ```
    /// use turnrouter::host::TurnResponse;
    /// use turnrouter::session::SessionRouteMap;
    ///
    /// let mut res = TurnResponse::new();
    /// res.route(SessionRouteMap::new().with("YesIntent", "/purchase/confirm"));
    /// assert!(!res.will_end_session());
    /// ```
    pub fn route(&mut self, next: SessionRouteMap) -> &mut Self {
        self.should_end_session(false);
        self.set_session_attr(ROUTE_ATTRIBUTE, next.to_attr());
        self
    }

    /// Set whether the session ends after this turn.
    pub fn should_end_session(&mut self, end: bool) -> &mut Self {
        self.end_session = end;
        self
    }

    /// Whether the session will end after this turn.
    #[must_use]
    pub fn will_end_session(&self) -> bool {
        self.end_session
    }

    /// Record a session attribute write.
    pub fn set_session_attr(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.session_ops.push(SessionOp::Set(key.into(), value));
        self
    }

    /// Record a session attribute removal.
    pub fn clear_session_attr(&mut self, key: impl Into<String>) -> &mut Self {
        self.session_ops.push(SessionOp::Remove(key.into()));
        self
    }

    /// Apply the recorded session writes, in order, to a persisted attribute
    /// map. Hosts call this when persisting the session for the next turn.
    pub fn apply_to(&self, attrs: &mut HashMap<String, Value>) {
        for op in &self.session_ops {
            match op {
                SessionOp::Set(key, value) => {
                    attrs.insert(key.clone(), value.clone());
                }
                SessionOp::Remove(key) => {
                    attrs.remove(key);
                }
            }
        }
    }
}
