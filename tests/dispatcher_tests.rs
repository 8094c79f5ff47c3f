//! Tests for the dispatch interceptor and session route state machine
//!
//! # Test Coverage
//!
//! Validates the interceptor's core responsibilities against a mock host app:
//! - Wiring: intent registration, default-route-driven registration, hooks
//! - Launch seeding of the first route for the next turn
//! - Session lifecycle: a pending route is consumed exactly once, then the
//!   default map applies again
//! - Pending state is cleared even when matching fails (self-healing)
//! - Route handlers observe the resolved route's params and query
//! - Unresolvable routes fail with a descriptive error, not a panic
//!
//! # Test Strategy
//!
//! `MockApp` implements `HostApp` and drives turns the way a real host
//! would: build a `TurnRequest` from the persisted session attributes, run
//! the registered entry point, then apply the response's session writes -
//! including when the entry returns an error, which is what a compliant host
//! must do.


use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing_util::TestTracing;
use turnrouter::{
    add_router, HostApp, IntentSchema, ResolvedRoute, RouteError, RouteHandler, RouteTable,
    RouterConfig, SessionRouteMap, TurnEntry, TurnRequest, TurnResponse, ROUTE_ATTRIBUTE,
};

#[derive(Default)]
struct MockApp {
    intents: HashMap<String, (Option<IntentSchema>, TurnEntry)>,
    launch: Option<TurnEntry>,
    pre: Option<RouteHandler>,
    post: Option<RouteHandler>,
}

impl HostApp for MockApp {
    fn on_intent(&mut self, name: &str, schema: Option<IntentSchema>, entry: TurnEntry) {
        self.intents.insert(name.to_string(), (schema, entry));
    }

    fn on_launch(&mut self, entry: TurnEntry) {
        self.launch = Some(entry);
    }

    fn on_pre(&mut self, hook: RouteHandler) {
        self.pre = Some(hook);
    }

    fn on_post(&mut self, hook: RouteHandler) {
        self.post = Some(hook);
    }
}

impl MockApp {
    /// Drive one intent turn and persist the response's session writes,
    /// error or not.
    fn fire_intent(
        &self,
        name: &str,
        attrs: &mut HashMap<String, Value>,
    ) -> (Result<(), RouteError>, TurnResponse) {
        let (_schema, entry) = self.intents.get(name).expect("intent registered");
        let mut req = TurnRequest::new(name, attrs.clone());
        let mut res = TurnResponse::new();
        let out = entry(&mut req, &mut res);
        res.apply_to(attrs);
        (out, res)
    }

    fn fire_launch(
        &self,
        attrs: &mut HashMap<String, Value>,
    ) -> (Result<(), RouteError>, TurnResponse) {
        let entry = self.launch.as_ref().expect("launch registered");
        let mut req = TurnRequest::launch(attrs.clone());
        let mut res = TurnResponse::new();
        let out = entry(&mut req, &mut res);
        res.apply_to(attrs);
        (out, res)
    }
}

/// Records every route handler invocation with the turn's resolved route.
#[derive(Clone, Default)]
struct CallLog {
    calls: Arc<Mutex<Vec<(String, Option<ResolvedRoute>)>>>,
}

impl CallLog {
    fn handler(
        &self,
        label: &str,
    ) -> impl Fn(&mut TurnRequest, &mut TurnResponse) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        move |req, _res| {
            calls
                .lock()
                .unwrap()
                .push((label.clone(), req.route().cloned()));
        }
    }

    fn labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    fn last_route(&self) -> Option<ResolvedRoute> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, route)| route.clone())
    }
}

#[test]
fn test_wiring_registers_intents_and_hooks() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();

    let schema = IntentSchema {
        utterances: vec!["give me a test{| topic}".to_string()],
        ..Default::default()
    };
    add_router(
        &mut app,
        RouterConfig::new()
            .pre(|_req, _res| {})
            .post(|_req, _res| {})
            .launch(|_req, _res| {})
            .default_route("AMAZON.CancelIntent", "/exit")
            .default_route("AMAZON.HelpIntent", "/help"),
        HashMap::from([
            ("TestIntent".to_string(), Some(schema.clone())),
            ("BlankIntent".to_string(), None),
        ]),
        RouteTable::new()
            .route("/exit", |_req, _res| {})
            .route("/help", |_req, _res| {}),
    );

    // Explicit intents, with and without a schema.
    let (stored_schema, _) = &app.intents["TestIntent"];
    assert_eq!(stored_schema.as_ref(), Some(&schema));
    let (blank_schema, _) = &app.intents["BlankIntent"];
    assert!(blank_schema.is_none());

    // Default-route intents are registered even without an intents entry.
    assert!(app.intents.contains_key("AMAZON.CancelIntent"));
    assert!(app.intents.contains_key("AMAZON.HelpIntent"));

    assert!(app.launch.is_some());
    assert!(app.pre.is_some());
    assert!(app.post.is_some());
}

#[test]
fn test_default_route_registration_survives_empty_intents() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();

    add_router(
        &mut app,
        RouterConfig::new().default_route("AMAZON.HelpIntent", "/help"),
        HashMap::new(),
        RouteTable::new().route("/help", |_req, _res| {}),
    );

    assert!(app.intents.contains_key("AMAZON.HelpIntent"));
}

#[test]
fn test_launch_seeds_route_and_keeps_session_open() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();

    add_router(
        &mut app,
        RouterConfig::new().launch(|_req, res| {
            res.route(SessionRouteMap::new().with("NextIntent", "/next"));
        }),
        HashMap::new(),
        RouteTable::new().route("/next", |_req, _res| {}),
    );

    let mut attrs = HashMap::new();
    let (out, res) = app.fire_launch(&mut attrs);
    assert!(out.is_ok());
    assert!(!res.will_end_session());
    assert_eq!(attrs.get(ROUTE_ATTRIBUTE), Some(&json!({"NextIntent": "/next"})));
}

#[test]
fn test_session_route_lifecycle_across_three_turns() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();
    let log = CallLog::default();

    let test_handler = {
        let log = log.clone();
        move |req: &mut TurnRequest, res: &mut TurnResponse| {
            log.handler("test")(req, res);
            res.route(SessionRouteMap::new().with("TestIntent", "/help"));
        }
    };
    add_router(
        &mut app,
        RouterConfig::new().default_route("TestIntent", "/test"),
        HashMap::new(),
        RouteTable::new()
            .route("/test", test_handler)
            .route("/help", log.handler("help")),
    );

    let mut attrs = HashMap::new();

    // Turn 1: no pending route, default applies; handler seeds /help.
    let (out, res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());
    assert!(!res.will_end_session());
    assert_eq!(attrs.get(ROUTE_ATTRIBUTE), Some(&json!({"TestIntent": "/help"})));

    // Turn 2: pending route consumed, stored map deleted.
    let (out, _res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());
    assert!(!attrs.contains_key(ROUTE_ATTRIBUTE));

    // Turn 3: nothing pending, falls back to the default again - not /help.
    let (out, _res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());

    assert_eq!(log.labels(), vec!["test", "help", "test"]);
}

#[test]
fn test_pending_route_cleared_even_when_match_fails() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();
    let log = CallLog::default();

    add_router(
        &mut app,
        RouterConfig::new().default_route("TestIntent", "/test"),
        HashMap::new(),
        RouteTable::new().route("/test", log.handler("test")),
    );

    let mut attrs = HashMap::from([(
        ROUTE_ATTRIBUTE.to_string(),
        json!({"TestIntent": "/nowhere/at/all"}),
    )]);

    let (out, _res) = app.fire_intent("TestIntent", &mut attrs);
    assert_eq!(
        out,
        Err(RouteError::NoRoute {
            intent: "TestIntent".to_string(),
            url: Some("/nowhere/at/all".to_string()),
        })
    );
    // The stale entry did not survive the failed turn.
    assert!(!attrs.contains_key(ROUTE_ATTRIBUTE));

    // Next turn self-heals onto the default route.
    let (out, _res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());
    assert_eq!(log.labels(), vec!["test"]);
}

#[test]
fn test_pending_map_for_other_intents_is_still_consumed() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();
    let log = CallLog::default();

    add_router(
        &mut app,
        RouterConfig::new().default_route("TestIntent", "/test"),
        HashMap::new(),
        RouteTable::new().route("/test", log.handler("test")),
    );

    // A pending map that names only some other intent: the whole map is
    // still deleted when TestIntent arrives.
    let mut attrs = HashMap::from([(
        ROUTE_ATTRIBUTE.to_string(),
        json!({"OtherIntent": "/elsewhere"}),
    )]);

    let (out, _res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());
    assert_eq!(log.labels(), vec!["test"]);
    assert!(!attrs.contains_key(ROUTE_ATTRIBUTE));
}

#[test]
fn test_session_route_params_and_query_reach_handler() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();
    let log = CallLog::default();

    add_router(
        &mut app,
        RouterConfig::new().default_route("TestIntent", "/test"),
        HashMap::new(),
        RouteTable::new()
            .route("/test", log.handler("test"))
            .route("/test/{testId}", log.handler("test_by_id")),
    );

    let mut attrs = HashMap::from([(
        ROUTE_ATTRIBUTE.to_string(),
        json!({"TestIntent": "/test/123?parameter=456&parameter2=789"}),
    )]);

    let (out, _res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());
    assert_eq!(log.labels(), vec!["test_by_id"]);

    let route = log.last_route().expect("handler saw the resolved route");
    assert_eq!(route.route, "/test/{testId}");
    assert_eq!(route.url, "/test/123?parameter=456&parameter2=789");
    assert_eq!(route.get_param("testId"), Some("123"));
    assert_eq!(route.get_query("parameter").unwrap().first(), "456");
    assert_eq!(route.get_query("parameter2").unwrap().first(), "789");
}

#[test]
fn test_default_route_scenario_with_empty_params_and_query() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();
    let log = CallLog::default();

    add_router(
        &mut app,
        RouterConfig::new().default_route("AMAZON.HelpIntent", "/help"),
        HashMap::new(),
        RouteTable::new()
            .route("/exit", log.handler("exit"))
            .route("/help", log.handler("help")),
    );

    let mut attrs = HashMap::new();
    let (out, _res) = app.fire_intent("AMAZON.HelpIntent", &mut attrs);
    assert!(out.is_ok());
    assert_eq!(log.labels(), vec!["help"]);

    let route = log.last_route().expect("handler saw the resolved route");
    assert_eq!(route.route, "/help");
    assert_eq!(route.url, "/help");
    assert!(route.params.is_empty());
    assert!(route.query.is_empty());
}

#[test]
fn test_unresolvable_intent_is_an_error_not_a_crash() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();

    add_router(
        &mut app,
        RouterConfig::new(),
        HashMap::from([("NoRouteIntent".to_string(), None)]),
        RouteTable::new().route("/help", |_req, _res| {}),
    );

    let mut attrs = HashMap::new();
    let (out, _res) = app.fire_intent("NoRouteIntent", &mut attrs);
    let err = out.unwrap_err();
    assert_eq!(
        err,
        RouteError::NoRoute {
            intent: "NoRouteIntent".to_string(),
            url: None,
        }
    );
    assert!(err.to_string().contains("NoRouteIntent"));
}

#[test]
fn test_handler_without_route_call_ends_session() {
    let _tracing = TestTracing::init();
    let mut app = MockApp::default();

    add_router(
        &mut app,
        RouterConfig::new().default_route("TestIntent", "/test"),
        HashMap::new(),
        RouteTable::new().route("/test", |_req, _res| {}),
    );

    let mut attrs = HashMap::new();
    let (out, res) = app.fire_intent("TestIntent", &mut attrs);
    assert!(out.is_ok());
    assert!(res.will_end_session());
    assert!(!attrs.contains_key(ROUTE_ATTRIBUTE));
}

#[test]
fn test_route_error_travels_on_a_host_error_channel() {
    // Hosts typically wrap dispatch failures in their own error type;
    // RouteError implements std::error::Error so that conversion is free.
    let err: anyhow::Error = RouteError::NoHandler {
        intent: "TestIntent".to_string(),
        route: "/test".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "no handler for TestIntent at route /test");
    assert!(err.downcast_ref::<RouteError>().is_some());
}

#[test]
fn test_route_error_messages_name_intent_and_route() {
    let err = RouteError::NoHandler {
        intent: "TestIntent".to_string(),
        route: "/test".to_string(),
    };
    assert_eq!(err.to_string(), "no handler for TestIntent at route /test");

    let err = RouteError::NoRoute {
        intent: "TestIntent".to_string(),
        url: Some("/missing".to_string()),
    };
    assert_eq!(
        err.to_string(),
        "no route for TestIntent: '/missing' matched no registered pattern"
    );

    let err = RouteError::NoRoute {
        intent: "TestIntent".to_string(),
        url: None,
    };
    assert_eq!(
        err.to_string(),
        "no route for TestIntent: no pending session route and no default route"
    );
}
