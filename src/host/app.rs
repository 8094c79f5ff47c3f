use super::{TurnRequest, TurnResponse};
use crate::dispatcher::RouteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A route handler: application code invoked with the turn's request and
/// response once the interceptor has resolved a route. Also the shape of the
/// `pre`/`post`/`launch` hooks forwarded to the host.
pub type RouteHandler = Arc<dyn Fn(&mut TurnRequest, &mut TurnResponse) + Send + Sync>;

/// A wrapped entry point registered with the host framework for one intent
/// name (or for launch). Returns `Err` when dispatch fails so the host can
/// surface the failure on its own error channel.
pub type TurnEntry = Box<dyn Fn(&mut TurnRequest, &mut TurnResponse) -> Result<(), RouteError> + Send + Sync>;

/// Utterance/slot schema forwarded verbatim to the host framework alongside
/// an intent registration. The router never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentSchema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub utterances: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub slots: HashMap<String, String>,
}

/// Registration surface of the host intent-dispatch framework.
///
/// The router composes over this trait explicitly instead of patching the
/// host's own registration methods: [`crate::dispatcher::add_router`] calls
/// through it once at wiring time, installing a wrapped entry point per
/// intent name plus the optional launch wrapper and `pre`/`post` hooks.
///
/// # Host obligations
///
/// - Invoke the registered entry exactly once per inbound turn for the
///   matching intent name, with a fresh [`TurnRequest`] / [`TurnResponse`].
/// - Serialize turns within one session: no two turns of the same session may
///   execute concurrently. The router assumes this and takes no locks.
/// - Persist the response's session writes ([`TurnResponse::apply_to`]) even
///   when the entry returns an error - consumed route state is cleared
///   through those writes.
/// - Translate a returned [`RouteError`] into its own user-facing fallback.
pub trait HostApp {
    /// Register an intent entry point, forwarding the schema verbatim.
    fn on_intent(&mut self, name: &str, schema: Option<IntentSchema>, entry: TurnEntry);

    /// Register the start-of-conversation entry point.
    fn on_launch(&mut self, entry: TurnEntry);

    /// Install a hook that runs before every turn's entry point.
    fn on_pre(&mut self, hook: RouteHandler);

    /// Install a hook that runs after every turn's entry point.
    fn on_post(&mut self, hook: RouteHandler);
}
