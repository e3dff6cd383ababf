//! JSON request/response codec.
//!
//! GET handlers receive their query string as a JSON object; POST handlers
//! receive the parsed request body as-is. Every response body is
//! pretty-printed JSON with a four-space indent.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::error::CodecError;
use crate::http::HttpRequest;

/// The only content type accepted on POST.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Split a request target into its path and query. A trailing `#fragment`
/// is discarded.
pub fn split_target(target: &str) -> (&str, &str) {
    let target = target.split_once('#').map_or(target, |(head, _)| head);
    target.split_once('?').unwrap_or((target, ""))
}

/// Decode a urlencoded query string into a JSON object.
///
/// Pairs with an empty value are dropped. A name seen once maps to a string;
/// a name seen several times maps to an array of its values in order.
pub fn decode_query(query: &str) -> Value {
    let mut args = Map::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        let value = Value::String(value.into_owned());
        match args.get_mut(&*name) {
            None => {
                args.insert(name.into_owned(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Value::Object(args)
}

/// Validate the declared content type and parse the body as JSON.
///
/// The content type is checked before the body is looked at.
pub fn decode_body(request: &HttpRequest) -> Result<Value, CodecError> {
    if request.header("content-type") != Some(JSON_CONTENT_TYPE) {
        return Err(CodecError::UnsupportedContentType);
    }
    let body = request.body.as_deref().unwrap_or_default();
    serde_json::from_str(body).map_err(CodecError::InvalidJson)
}

/// Serialize `value` as pretty-printed JSON.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
