//! Method + path routing table.
//!
//! Routes are registered explicitly while the application is assembled and
//! looked up by exact path match. There are no path parameters, wildcards
//! or trailing-slash normalization; `/list` and `/list/` are different
//! routes.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::Fault;
use crate::http::HttpMethod;

/// What a handler produces: a JSON body, no body at all, or a fault.
pub type HandlerResult = Result<Option<Value>, Fault>;

/// A route handler. It gets exclusive access to the application state for
/// the duration of the call, plus the decoded request arguments.
pub type Handler<S> = Box<dyn Fn(&mut S, Value) -> HandlerResult + Send + Sync>;

/// Routing table from `(method, path)` to a handler over state `S`.
pub struct Router<S> {
    routes: HashMap<(HttpMethod, String), Handler<S>>,
}

impl<S> Router<S> {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Store `handler` for `(method, path)`. A later registration for the
    /// same key replaces the earlier one.
    pub fn register<F>(&mut self, method: HttpMethod, path: &str, handler: F)
    where
        F: Fn(&mut S, Value) -> HandlerResult + Send + Sync + 'static,
    {
        if self
            .routes
            .insert((method, path.to_string()), Box::new(handler))
            .is_some()
        {
            tracing::debug!(%method, path, "route handler replaced");
        }
    }

    pub fn get<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&mut S, Value) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(HttpMethod::Get, path, handler);
        self
    }

    pub fn post<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&mut S, Value) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(HttpMethod::Post, path, handler);
        self
    }

    pub fn resolve(&self, method: HttpMethod, path: &str) -> Option<&Handler<S>> {
        self.routes.get(&(method, path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Router<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self
            .routes
            .keys()
            .map(|(method, path)| format!("{method} {path}"))
            .collect();
        keys.sort();
        f.debug_struct("Router").field("routes", &keys).finish()
    }
}
