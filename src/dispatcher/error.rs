use std::fmt;

/// Routing failure for one conversational turn.
///
/// Returned by the wrapped intent entry point when no callable handler can
/// be resolved. Dispatch is never retried: the host framework is expected to
/// translate the error into its own user-facing fallback. Consumed session
/// route state is cleared before matching, so a failed turn cannot corrupt
/// the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route was resolved for the intent.
    ///
    /// Either nothing selected a route (no pending session route and no
    /// default-route entry, `url` is `None`), or a route string was selected
    /// but matched no registered pattern (`url` names the attempted route).
    NoRoute {
        /// The intent that fired.
        intent: String,
        /// The route string that failed to match, when one was selected.
        url: Option<String>,
    },
    /// A pattern was resolved but no callable handler is bound to it.
    NoHandler {
        /// The intent that fired.
        intent: String,
        /// The resolved pattern string.
        route: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoRoute { intent, url: None } => {
                write!(
                    f,
                    "no route for {intent}: no pending session route and no default route"
                )
            }
            RouteError::NoRoute {
                intent,
                url: Some(url),
            } => {
                write!(
                    f,
                    "no route for {intent}: '{url}' matched no registered pattern"
                )
            }
            RouteError::NoHandler { intent, route } => {
                write!(f, "no handler for {intent} at route {route}")
            }
        }
    }
}

impl std::error::Error for RouteError {}
