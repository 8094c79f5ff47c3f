//! # turnrouter
//!
//! **turnrouter** adds stateful, multi-turn route semantics on top of a
//! voice-assistant intent-dispatch framework. Instead of every spoken intent
//! mapping to exactly one fixed handler, an application defines URL-style
//! route patterns, and a handler invoked on one conversational turn declares
//! which route each future intent should resolve to on the *next* turn.
//!
//! This lets a single intent name (e.g. `YesIntent`) behave differently
//! depending on conversational context - "confirm purchase" vs "confirm
//! cancellation" - implementing a lightweight per-session finite-state
//! navigation layer over an otherwise stateless intent dispatcher.
//!
//! ## Architecture
//!
//! The library is organized into a few key modules:
//!
//! - **[`matcher`]** - pure route resolution: pattern compilation,
//!   specificity scoring, path/query parameter extraction
//! - **[`registry`]** - the immutable route table, default-route map, and
//!   intent registration list, frozen at wiring time
//! - **[`session`]** - the typed, session-carried next-route map and its
//!   serialization at the session-attribute boundary
//! - **[`dispatcher`]** - the per-turn interceptor wired over the host's
//!   registration entry points
//! - **[`host`]** - the boundary with the host intent-dispatch framework:
//!   the [`host::HostApp`] registration trait and the per-turn
//!   [`host::TurnRequest`] / [`host::TurnResponse`] types
//!
//! ## Turn Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host framework
//!     participant Entry as Wrapped entry point
//!     participant Session as SessionRouteMap
//!     participant Matcher as Matcher
//!     participant Handler as Route handler
//!
//!     Host->>Entry: intent turn (request, response)
//!     Entry->>Session: take pending route for intent
//!     Session-->>Entry: "/test/123?x=1" (stored map deleted)
//!
//!     alt nothing pending
//!         Entry->>Entry: default route for intent
//!     end
//!
//!     Entry->>Matcher: resolve against route table
//!     Matcher-->>Entry: ResolvedRoute {route, params, query, url}
//!
//!     alt no route or no handler
//!         Entry-->>Host: Err(RouteError)
//!     end
//!
//!     Entry->>Handler: invoke with request + response
//!     Handler->>Session: response.route(next map)
//!     Note over Session: persisted by the host<br/>for the next turn
//!     Entry-->>Host: Ok
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use turnrouter::{add_router, RouteTable, RouterConfig, SessionRouteMap};
//!
//! let dispatcher = add_router(
//!     &mut app, // your HostApp implementation
//!     RouterConfig::new()
//!         .launch(|_req, res| {
//!             // seed the first route for the next turn
//!             res.route(SessionRouteMap::new().with("YesIntent", "/purchase/confirm"));
//!         })
//!         .default_route("AMAZON.HelpIntent", "/help"),
//!     HashMap::new(),
//!     RouteTable::new()
//!         .route("/help", |_req, _res| { /* speak help */ })
//!         .route("/purchase/confirm", |req, res| {
//!             // req.route() carries params/query for introspection
//!             res.route(SessionRouteMap::new().with("YesIntent", "/checkout"));
//!         }),
//! );
//! ```
//!
//! ## Runtime Considerations
//!
//! Dispatch is single-turn, single-threaded, and request-scoped: the core
//! performs no I/O and cannot block. The host framework owns the request
//! lifecycle and is assumed to serialize turns within a session; the
//! registry is read-only after construction, so the crate takes no locks.
//! Speech understanding, slot parsing, response bodies, and transport are
//! the host's concern, not this crate's.

pub mod dispatcher;
pub mod host;
pub mod matcher;
pub mod registry;
pub mod session;

pub use dispatcher::{add_router, RouteDispatcher, RouteError, RouterConfig};
pub use host::{HostApp, IntentSchema, RouteHandler, TurnEntry, TurnRequest, TurnResponse};
pub use matcher::{resolve_route, ParamVec, QueryMap, QueryValue, ResolvedRoute, RoutePattern};
pub use registry::{IntentRegistration, RouteRegistry, RouteTable};
pub use session::{SessionRouteMap, ROUTE_ATTRIBUTE};
