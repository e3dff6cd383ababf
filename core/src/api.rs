//! The item API: application state and its route table.
//!
//! | route         | handler   |
//! |---------------|-----------|
//! | `GET /`       | [`index`]  |
//! | `GET /tick`   | [`tick`]   |
//! | `GET /list`   | [`list`]   |
//! | `GET /search` | [`search`] |
//! | `POST /add`   | [`add`]    |
//! | `POST /delete`| [`delete`] |
//!
//! Handlers pull their parameters out of the decoded arguments. A missing
//! or `null` parameter is a validation failure reported in the payload. A
//! non-object POST body, a repeated `q` or a non-string `name` or
//! `description` is a fault.

use serde_json::{Map, Value};

use crate::demo::DemoState;
use crate::dispatch::Dispatcher;
use crate::error::Fault;
use crate::router::{HandlerResult, Router};
use crate::store::{ItemStore, Outcome};

/// Everything the handlers share. Guarded as one unit by the dispatcher.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ItemStore,
    pub demo: DemoState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            store: ItemStore::seeded(),
            demo: DemoState::default(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .get("/", index)
        .get("/tick", tick)
        .get("/list", list)
        .get("/search", search)
        .post("/add", add)
        .post("/delete", delete)
}

/// A dispatcher over a fresh `AppState`.
pub fn app() -> Dispatcher<AppState> {
    Dispatcher::new(routes(), AppState::default())
}

pub fn index(state: &mut AppState, _args: Value) -> HandlerResult {
    Ok(Some(serde_json::to_value(state.demo.current())?))
}

pub fn tick(state: &mut AppState, _args: Value) -> HandlerResult {
    state.demo.advance();
    Ok(None)
}

pub fn list(state: &mut AppState, _args: Value) -> HandlerResult {
    Ok(Some(serde_json::to_value(state.store.list())?))
}

pub fn search(state: &mut AppState, args: Value) -> HandlerResult {
    let args = object(&args)?;
    let q = string_field(args, "q", "a single value")?;
    Ok(Some(serde_json::to_value(state.store.search(q.as_deref()))?))
}

pub fn add(state: &mut AppState, args: Value) -> HandlerResult {
    let args = object(&args)?;
    let name = string_field(args, "name", "a string")?;
    let description = string_field(args, "description", "a string")?;
    let outcome = state.store.add(name, description)?;
    if let Outcome::Done(item) = &outcome {
        tracing::info!(id = item.id, name = %item.name, "item added");
    }
    Ok(Some(serde_json::to_value(outcome)?))
}

pub fn delete(state: &mut AppState, args: Value) -> HandlerResult {
    let args = object(&args)?;
    let id = present(args, "id");
    Ok(Some(serde_json::to_value(state.store.delete(id))?))
}

fn object(args: &Value) -> Result<&Map<String, Value>, Fault> {
    args.as_object().ok_or(Fault::InvalidArguments {
        expected: "a JSON object",
    })
}

/// The field's value, treating `null` like an absent field.
fn present<'a>(args: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    args.get(field).filter(|value| !value.is_null())
}

fn string_field(
    args: &Map<String, Value>,
    field: &'static str,
    expected: &'static str,
) -> Result<Option<String>, Fault> {
    match present(args, field) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(Fault::InvalidField { field, expected }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn registers_six_routes() {
        assert_eq!(routes().len(), 6);
    }

    #[test]
    fn search_rejects_repeated_q() {
        let mut state = AppState::default();
        let err = search(&mut state, json!({ "q": ["A", "B"] })).unwrap_err();
        assert_eq!(err.to_string(), "field `q` must be a single value");
    }

    #[test]
    fn add_treats_null_as_missing() {
        let mut state = AppState::default();
        let result = add(&mut state, json!({ "name": "E", "description": null })).unwrap();
        assert_eq!(
            result,
            Some(json!({ "error": "name and description are required parameters" }))
        );
        assert_eq!(state.store.len(), 4);
    }

    #[test]
    fn add_rejects_non_string_name() {
        let mut state = AppState::default();
        let err = add(&mut state, json!({ "name": 5, "description": "d" })).unwrap_err();
        assert!(matches!(err, Fault::InvalidField { field: "name", .. }));
    }

    #[test]
    fn post_arguments_must_be_an_object() {
        let mut state = AppState::default();
        let err = delete(&mut state, json!([2])).unwrap_err();
        assert_eq!(err.to_string(), "arguments must be a JSON object");
    }

    #[test]
    fn delete_echoes_the_id_as_sent() {
        let mut state = AppState::default();
        assert_eq!(
            delete(&mut state, json!({ "id": "2" })).unwrap(),
            Some(json!({ "error": "item not found with id 2" }))
        );
        assert_eq!(
            delete(&mut state, json!({ "id": 2.0 })).unwrap(),
            Some(json!({ "deleted": 2.0 }))
        );
        assert_eq!(state.store.len(), 3);
    }

    #[test]
    fn tick_returns_nothing_and_index_follows_it() {
        let mut state = AppState::default();
        assert_eq!(tick(&mut state, Value::Null).unwrap(), None);
        let snapshot = index(&mut state, Value::Null).unwrap().unwrap();
        assert_eq!(snapshot["items"][0]["date"], "02-01-2025");
        assert_eq!(state.demo.tick(), 1);
    }
}
