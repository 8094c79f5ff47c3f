//! # Dispatcher Module
//!
//! The dispatcher module threads route state through conversation turns. It
//! wraps the host framework's launch/intent registration entry points so
//! every inbound turn is resolved against the route table before the
//! application's route handler runs.
//!
//! ## Overview
//!
//! The dispatcher is responsible for:
//! - Wiring routes, default routes, and intents into a host app
//!   ([`add_router`])
//! - Consuming the pending session route for the arriving intent (at most
//!   once, cleared before matching)
//! - Resolving a route via the matcher and attaching the result to the
//!   request
//! - Invoking the bound route handler, or failing the turn with a
//!   [`RouteError`]
//!
//! ## Turn Flow
//!
//! 1. Host fires the wrapped entry point for the inbound intent
//! 2. Pending session route for that intent is taken and the stored map
//!    deleted
//! 3. Default route fallback applies when nothing was pending
//! 4. Matcher resolves the route string to a pattern and parameters
//! 5. The handler bound to the pattern runs with the original request and
//!    response; its `route(...)` call on the response seeds the next turn
//!
//! ## Composition, not patching
//!
//! The source-of-truth route table lives in an explicit
//! [`crate::registry::RouteRegistry`] owned by the dispatcher; registration
//! goes through the [`crate::host::HostApp`] trait rather than mutating the
//! host object's methods in place.

mod core;
mod error;

pub use core::{add_router, RouteDispatcher, RouterConfig};
pub use error::RouteError;
