//! Round-trip against a live server over real HTTP.
//!
//! # Design
//! Starts the server on a random port in a background thread, then drives
//! it with ureq. Validates that the axum bridge and the core dispatcher
//! agree end to end, including status codes the oneshot tests cannot see
//! through a real transport.

use serde_json::{json, Value};

/// A fresh agent per request, so no pooled connection outlives a response
/// whose request body the server never read.
fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Read a response into `(status, body)`. Empty bodies become `Value::Null`.
fn read(mut response: ureq::http::Response<ureq::Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().unwrap_or_default();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).expect("response body should be JSON")
    };
    (status, body)
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            itemapi_server::run(listener, itemapi_server::app()).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn live_round_trip() {
    let base = start_server();

    // Index rotates with tick.
    let (status, first) = read(agent().get(&format!("{base}/")).call().unwrap());
    assert_eq!(status, 200);
    assert_eq!(first["items"].as_array().unwrap().len(), 12);

    let (status, body) = read(agent().get(&format!("{base}/tick")).call().unwrap());
    assert_eq!(status, 200);
    assert_eq!(body, Value::Null);

    let (_, second) = read(agent().get(&format!("{base}/")).call().unwrap());
    assert_eq!(second["items"].as_array().unwrap().len(), 4);

    // Search collapses a single q.
    let (status, body) = read(agent().get(&format!("{base}/search?q=B")).call().unwrap());
    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);

    // Add with a non-JSON content type is rejected and nothing changes.
    let (status, body) = read(
        agent()
            .post(&format!("{base}/add"))
            .content_type("text/plain")
            .send(r#"{"name":"E","description":"desc"}"#.as_bytes())
            .unwrap(),
    );
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "posted data must be in json format" }));

    let (_, body) = read(agent().get(&format!("{base}/list")).call().unwrap());
    assert_eq!(body["count"], 4);

    // Add, then delete twice.
    let (status, body) = read(
        agent()
            .post(&format!("{base}/add"))
            .content_type("application/json")
            .send(r#"{"name":"E","description":"desc"}"#.as_bytes())
            .unwrap(),
    );
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "id": 5, "name": "E", "description": "desc" }));

    let delete = |id: i64| {
        read(
            agent()
                .post(&format!("{base}/delete"))
                .content_type("application/json")
                .send(json!({ "id": id }).to_string().as_bytes())
                .unwrap(),
        )
    };
    assert_eq!(delete(2), (200, json!({ "deleted": 2 })));
    assert_eq!(delete(2), (200, json!({ "error": "item not found with id 2" })));

    let (_, body) = read(agent().get(&format!("{base}/list")).call().unwrap());
    assert_eq!(body["count"], 4);

    // Unknown route.
    let (status, body) = read(agent().get(&format!("{base}/missing")).call().unwrap());
    assert_eq!(status, 404);
    assert_eq!(body, json!({ "error": "not found" }));
}
