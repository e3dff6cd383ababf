//! Error types for the dispatch engine.
//!
//! # Design
//! Two families are kept apart. `CodecError` is raised before any handler
//! runs and maps to 400. `Fault` is an unexpected failure inside a handler
//! and maps to 500. Validation failures the client can fix (a missing
//! parameter) are neither: handlers return them as ordinary payloads.

/// Request body could not be turned into handler arguments.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The declared content type was absent or not exactly `application/json`.
    #[error("posted data must be in json format")]
    UnsupportedContentType,

    /// The body was declared as JSON but did not parse.
    #[error("posted data is not valid json")]
    InvalidJson(#[source] serde_json::Error),
}

/// Unexpected failure raised while a handler runs.
///
/// The `Display` output is the descriptive payload echoed to the client in
/// the 500 body (unless the dispatcher is configured to hide it).
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// The collection has no last item to derive the next id from.
    #[error("cannot assign an id: the collection is empty")]
    EmptyCollection,

    /// The handler arguments were not of the expected JSON shape.
    #[error("arguments must be {expected}")]
    InvalidArguments { expected: &'static str },

    /// A present field had the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// A handler result could not be serialized.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}
