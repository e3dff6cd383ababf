//! Per-request orchestration.
//!
//! # Design
//! `Dispatcher` owns the routing table and the application state. One call
//! to `dispatch` takes a request through every step in a single pass:
//! split the target, decode arguments (query for GET, JSON body for POST),
//! resolve the handler, run it, and map the outcome to a status and body.
//!
//! | outcome                     | status | body                          |
//! |-----------------------------|--------|-------------------------------|
//! | content type / JSON invalid | 400    | `{ "error": <codec message> }` |
//! | no route                    | 404    | `{ "error": "not found" }`    |
//! | handler returned a value    | 200    | the value                     |
//! | handler returned nothing    | 200    | empty                         |
//! | handler faulted             | 500    | `{ "error": <fault message> }` |
//!
//! The state sits behind a single mutex so that each handler observes and
//! mutates it atomically even when the host serves requests concurrently.

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::codec;
use crate::error::Fault;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::router::Router;

/// Message sent in place of the fault detail when detail is hidden.
pub const HIDDEN_FAULT_MESSAGE: &str = "internal server error";

pub struct Dispatcher<S> {
    router: Router<S>,
    state: Mutex<S>,
    expose_fault_detail: bool,
}

impl<S> Dispatcher<S> {
    /// Fault detail is echoed to clients unless turned off with
    /// [`Dispatcher::expose_fault_detail`].
    pub fn new(router: Router<S>, state: S) -> Self {
        Self {
            router,
            state: Mutex::new(state),
            expose_fault_detail: true,
        }
    }

    /// Whether a 500 body carries the fault message or a generic one. The
    /// detail is logged either way.
    pub fn expose_fault_detail(mut self, expose: bool) -> Self {
        self.expose_fault_detail = expose;
        self
    }

    /// Run `f` against the current state under the state lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.state.lock())
    }

    pub fn dispatch(&self, request: &HttpRequest) -> HttpResponse {
        let (path, query) = codec::split_target(&request.target);
        let response = self.respond(request, path, query);
        tracing::debug!(
            method = %request.method,
            path,
            status = response.status,
            "request dispatched"
        );
        response
    }

    fn respond(&self, request: &HttpRequest, path: &str, query: &str) -> HttpResponse {
        let args = match request.method {
            HttpMethod::Get => codec::decode_query(query),
            HttpMethod::Post => match codec::decode_body(request) {
                Ok(args) => args,
                Err(err) => {
                    tracing::debug!(path, error = ?err, "rejected request body");
                    return error_response(400, &err.to_string());
                }
            },
        };

        let Some(handler) = self.router.resolve(request.method, path) else {
            return error_response(404, "not found");
        };

        let result = {
            let mut state = self.state.lock();
            handler(&mut *state, args)
        };
        let encoded = result.and_then(|value| match value {
            Some(value) => codec::encode(&value).map(Some).map_err(Fault::from),
            None => Ok(None),
        });

        match encoded {
            Ok(Some(body)) => HttpResponse::json(200, body),
            Ok(None) => HttpResponse::empty(200),
            Err(fault) => {
                tracing::error!(method = %request.method, path, error = %fault, "handler fault");
                if self.expose_fault_detail {
                    error_response(500, &fault.to_string())
                } else {
                    error_response(500, HIDDEN_FAULT_MESSAGE)
                }
            }
        }
    }
}

fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = codec::encode(&json!({ "error": message })).unwrap_or_default();
    HttpResponse::json(status, body)
}

/// Decode a response body produced by the dispatcher. Empty bodies decode
/// to `Value::Null`.
pub fn decode_response(response: &HttpResponse) -> Result<Value, serde_json::Error> {
    if response.body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body)
}
