//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! dispatcher consumes an `HttpRequest` and produces an `HttpResponse`
//! without ever touching the network; the host (the axum adapter, or a test)
//! owns the actual I/O. This keeps routing and argument decoding
//! deterministic and easy to test.
//!
//! All fields use owned types (`String`, `Vec`) so values can be built and
//! inspected without lifetime concerns.

use std::fmt;
use std::str::FromStr;

/// HTTP method accepted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method name is not one the router knows about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported method {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// `target` is the request target as it appears on the request line: the
/// path, optionally followed by `?query`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(target: &str) -> Self {
        Self {
            method: HttpMethod::Get,
            target: target.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST carrying `body` with `content-type: application/json`.
    pub fn post_json(target: &str, body: &str) -> Self {
        Self {
            method: HttpMethod::Post,
            target: target.to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body.to_string()),
        }
    }

    /// First value of the header called `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by `Dispatcher::dispatch`; the host writes it to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A response whose body is an already encoded JSON document.
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }
}
