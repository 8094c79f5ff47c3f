//! # Host Module
//!
//! The boundary with the host intent-dispatch framework.
//!
//! turnrouter does not speak any transport itself: the host owns the request
//! lifecycle, utterance understanding, slot parsing, response bodies, and
//! session persistence. This module defines what the router needs from the
//! host - the [`HostApp`] registration surface - and the crate-owned
//! [`TurnRequest`] / [`TurnResponse`] types that flow through one
//! conversational turn.
//!
//! The `route(...)` capability the router exposes to application handlers is
//! [`TurnResponse::route`]: calling it keeps the session open and persists
//! the next turn's route selection in one step.

mod app;
mod request;
mod response;

pub use app::{HostApp, IntentSchema, RouteHandler, TurnEntry};
pub use request::TurnRequest;
pub use response::TurnResponse;
