//! Transport-free core of the item API.
//!
//! # Overview
//! Consumes `HttpRequest` values and produces `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the actual
//! HTTP exchange, which keeps routing, argument decoding and the handlers
//! fully deterministic and testable.
//!
//! # Design
//! - `Router` maps `(method, path)` to a handler, by exact path match.
//! - `Dispatcher` owns the router and the application state and maps every
//!   outcome (value, nothing, fault, missing route, bad body) to a status.
//! - `api` wires the item store and the rotating demo state into six routes.
//! - Validation failures are ordinary payloads; only faults become 500s.

pub mod api;
pub mod codec;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod router;
pub mod store;

pub use api::{app, routes, AppState};
pub use demo::{DemoState, Snapshot};
pub use dispatch::{decode_response, Dispatcher};
pub use error::{CodecError, Fault};
pub use http::{HttpMethod, HttpRequest, HttpResponse, UnsupportedMethod};
pub use router::{Handler, HandlerResult, Router};
pub use store::{Deleted, Item, ItemStore, Listing, Outcome};
