//! Dispatcher core module - the per-turn interception logic.

use crate::host::{HostApp, IntentSchema, RouteHandler, TurnRequest, TurnResponse};
use crate::matcher::resolve_route;
use crate::registry::{IntentRegistration, RouteRegistry, RouteTable};
use crate::session::{SessionRouteMap, ROUTE_ATTRIBUTE};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::RouteError;

/// Wiring-time configuration for [`add_router`]: the optional `pre`/`post`/
/// `launch` hooks and the per-intent default routes.
#[derive(Default)]
pub struct RouterConfig {
    pre: Option<RouteHandler>,
    post: Option<RouteHandler>,
    launch: Option<RouteHandler>,
    default_routes: HashMap<String, String>,
}

impl RouterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook forwarded to the host to run before every turn.
    #[must_use]
    pub fn pre<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut TurnRequest, &mut TurnResponse) + Send + Sync + 'static,
    {
        self.pre = Some(Arc::new(hook));
        self
    }

    /// Hook forwarded to the host to run after every turn.
    #[must_use]
    pub fn post<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut TurnRequest, &mut TurnResponse) + Send + Sync + 'static,
    {
        self.post = Some(Arc::new(hook));
        self
    }

    /// Start-of-conversation handler. No route resolution happens on launch;
    /// the handler's opportunity is to seed the first route for the next
    /// turn via [`TurnResponse::route`].
    #[must_use]
    pub fn launch<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut TurnRequest, &mut TurnResponse) + Send + Sync + 'static,
    {
        self.launch = Some(Arc::new(handler));
        self
    }

    /// Fallback route for an intent arriving with no pending session route.
    #[must_use]
    pub fn default_route(mut self, intent: impl Into<String>, route: impl Into<String>) -> Self {
        self.default_routes.insert(intent.into(), route.into());
        self
    }
}

/// Per-turn route resolution over an immutable [`RouteRegistry`].
///
/// One inbound turn produces exactly one synchronous invocation of
/// [`RouteDispatcher::dispatch_intent`]; the host serializes turns within a
/// session, so the dispatcher holds no locks.
pub struct RouteDispatcher {
    registry: Arc<RouteRegistry>,
}

impl RouteDispatcher {
    /// The registry this dispatcher resolves against.
    #[must_use]
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Resolve and invoke the route handler for one intent turn.
    ///
    /// Sequence:
    /// 1. Take the pending [`SessionRouteMap`] entry for the arriving intent
    ///    and delete the whole stored map - unconditionally, before any
    ///    matching, so stale state cannot survive a failed turn.
    /// 2. Fall back to the intent's default route when nothing was pending.
    /// 3. Resolve the route string against the route table and attach the
    ///    [`crate::matcher::ResolvedRoute`] to the request.
    /// 4. Invoke the handler bound to the resolved pattern.
    ///
    /// Routing is authoritative: when no callable handler can be resolved
    /// the turn fails with a [`RouteError`] naming the intent and the
    /// attempted route - there is no silent fallback handler.
    pub fn dispatch_intent(
        &self,
        req: &mut TurnRequest,
        res: &mut TurnResponse,
    ) -> Result<(), RouteError> {
        let intent = req.intent_name().to_string();

        let mut selection: Option<String> = None;
        if let Some(stored) = req.session_attr(ROUTE_ATTRIBUTE) {
            let pending = SessionRouteMap::from_attr(stored);
            // Pending -> Idle happens here, before matching is attempted.
            res.clear_session_attr(ROUTE_ATTRIBUTE);
            selection = pending
                .as_ref()
                .and_then(|map| map.get(&intent))
                .map(str::to_string);
            if let Some(route) = &selection {
                debug!(intent = %intent, route = %route, "Pending session route consumed");
            }
        }

        let selection = match selection {
            Some(route) => Some(route),
            None => self.registry.default_route(&intent).map(str::to_string),
        };

        let Some(url) = selection else {
            warn!(intent = %intent, "No pending session route and no default route");
            return Err(RouteError::NoRoute { intent, url: None });
        };

        let Some(resolved) = resolve_route(&url, self.registry.patterns()) else {
            return Err(RouteError::NoRoute {
                intent,
                url: Some(url),
            });
        };

        let route = resolved.route.clone();
        req.set_route(resolved);

        let Some(handler) = self.registry.handler_for(&route) else {
            error!(intent = %intent, route = %route, "No handler bound to resolved route");
            return Err(RouteError::NoHandler { intent, route });
        };

        info!(intent = %intent, route = %route, "Dispatching turn to route handler");
        (handler.as_ref())(req, res);
        Ok(())
    }
}

/// Wire routes, default routes, and intent registrations into a host app.
///
/// The single entry point of the crate: builds the immutable
/// [`RouteRegistry`], installs the wrapped launch and intent entry points
/// through the [`HostApp`] registration surface, and forwards the
/// `pre`/`post` hooks verbatim.
///
/// Intent registration is permissive: an empty `intents` map skips explicit
/// registration, but every intent named in the config's default routes still
/// gets a schema-less registration so its default route can fire.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = add_router(
///     &mut app,
///     RouterConfig::new()
///         .launch(|_req, res| {
///             res.route(SessionRouteMap::new().with("TestIntent", "/test"));
///         })
///         .default_route("AMAZON.HelpIntent", "/help"),
///     HashMap::from([("TestIntent".to_string(), Some(schema))]),
///     RouteTable::new()
///         .route("/help", help_handler)
///         .route("/test/{testId}", test_handler),
/// );
/// ```
pub fn add_router<A: HostApp>(
    app: &mut A,
    config: RouterConfig,
    intents: HashMap<String, Option<IntentSchema>>,
    routes: RouteTable,
) -> Arc<RouteDispatcher> {
    let RouterConfig {
        pre,
        post,
        launch,
        default_routes,
    } = config;

    let mut registrations: Vec<IntentRegistration> = intents
        .into_iter()
        .map(|(name, schema)| IntentRegistration { name, schema })
        .collect();
    // Default-route-driven registration proceeds even when `intents` is
    // empty (permissive degraded mode).
    for intent in default_routes.keys() {
        if !registrations.iter().any(|r| r.name == *intent) {
            registrations.push(IntentRegistration {
                name: intent.clone(),
                schema: None,
            });
        }
    }
    registrations.sort_by(|a, b| a.name.cmp(&b.name));

    let registry = Arc::new(RouteRegistry::new(routes, default_routes, registrations));
    let dispatcher = Arc::new(RouteDispatcher { registry });

    if let Some(hook) = pre {
        app.on_pre(hook);
    }
    if let Some(hook) = post {
        app.on_post(hook);
    }
    if let Some(handler) = launch {
        app.on_launch(Box::new(move |req, res| {
            (handler.as_ref())(req, res);
            Ok(())
        }));
    }

    let registrations = dispatcher.registry().intents().to_vec();
    for registration in registrations {
        let dispatcher = Arc::clone(&dispatcher);
        app.on_intent(
            &registration.name,
            registration.schema,
            Box::new(move |req, res| dispatcher.dispatch_intent(req, res)),
        );
    }

    dispatcher
}
