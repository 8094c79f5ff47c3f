use crate::matcher::ResolvedRoute;
use serde_json::Value;
use std::collections::HashMap;

/// One inbound conversational turn as seen by route handlers.
///
/// Hosts construct a `TurnRequest` from their transport event: the firing
/// intent's name, its slot values (opaque strings - slot parsing belongs to
/// the host framework), and a snapshot of the session's persisted attributes.
///
/// The dispatch interceptor attaches the turn's [`ResolvedRoute`] before the
/// route handler runs; it is scoped to this turn and never persisted.
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    intent: String,
    slots: HashMap<String, String>,
    session: HashMap<String, Value>,
    route: Option<ResolvedRoute>,
}

impl TurnRequest {
    /// Build a request for an intent turn.
    #[must_use]
    pub fn new(intent: impl Into<String>, session: HashMap<String, Value>) -> Self {
        Self {
            intent: intent.into(),
            slots: HashMap::new(),
            session,
            route: None,
        }
    }

    /// Build a request for a launch turn (no intent is firing).
    #[must_use]
    pub fn launch(session: HashMap<String, Value>) -> Self {
        Self::new("", session)
    }

    /// Attach slot values captured by the host framework.
    #[must_use]
    pub fn with_slots(mut self, slots: HashMap<String, String>) -> Self {
        self.slots = slots;
        self
    }

    /// Name of the currently-firing intent; empty on a launch turn.
    #[must_use]
    pub fn intent_name(&self) -> &str {
        &self.intent
    }

    /// Raw slot value by name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    /// Persisted session attribute by key.
    #[must_use]
    pub fn session_attr(&self, key: &str) -> Option<&Value> {
        self.session.get(key)
    }

    /// The route resolved for this turn, with its extracted parameters,
    /// query values, matched pattern, and original route string.
    ///
    /// `None` until the interceptor has resolved a route (always `None` in
    /// launch and pre hooks).
    #[must_use]
    pub fn route(&self) -> Option<&ResolvedRoute> {
        self.route.as_ref()
    }

    pub(crate) fn set_route(&mut self, route: ResolvedRoute) {
        self.route = Some(route);
    }
}
