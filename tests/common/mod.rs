//! Shared test doubles: a recording transport with scripted responses and a
//! controllable clock.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Map, Value};
use tasklink::cache::Clock;
use tasklink::client::Api;
use tasklink::config::Config;
use tasklink::transport::{Request, Response, Transport};

/// Transport double that records every request and answers from a scripted
/// queue. An empty queue answers with an empty collection payload.
#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<Request>>,
    responses: Mutex<VecDeque<Response>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Response) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Queue a 200 response whose `data` payload is the given value.
    pub fn push_data(&self, data: Value) {
        self.push(json_response(data));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &Request) -> tasklink::Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| json_response(json!([])));
        Ok(response)
    }
}

/// A 200 application/json response wrapping `data` in the envelope.
pub fn json_response(data: Value) -> Response {
    Response {
        status: 200,
        content_type: Some("application/json".to_string()),
        retry_after: None,
        body: json!({ "data": data }).to_string(),
    }
}

/// A 200 application/json response with a verbatim body.
pub fn raw_response(body: Value) -> Response {
    Response {
        status: 200,
        content_type: Some("application/json".to_string()),
        retry_after: None,
        body: body.to_string(),
    }
}

/// A bodyless response with the given status.
pub fn status_response(status: u16) -> Response {
    Response {
        status,
        content_type: None,
        retry_after: None,
        body: String::new(),
    }
}

/// A 429 carrying a `Retry-After` header.
pub fn rate_limited(retry_after: &str) -> Response {
    Response {
        status: 429,
        content_type: None,
        retry_after: Some(retry_after.to_string()),
        body: String::new(),
    }
}

/// A 429 with no `Retry-After` header at all.
pub fn rate_limited_without_header() -> Response {
    Response {
        status: 429,
        content_type: None,
        retry_after: None,
        body: String::new(),
    }
}

/// Scripted clock: time only moves via `advance` and recorded sleeps.
#[derive(Default)]
pub struct MockClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        self.advance(duration);
    }
}

/// An [`Api`] wired to a mock transport and clock, with both halves kept
/// around for inspection.
pub struct TestApi {
    pub api: Api,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<MockClock>,
}

pub fn api() -> TestApi {
    api_with_config(Config::default())
}

pub fn api_with_config(config: Config) -> TestApi {
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(MockClock::new());
    let api = Api::with_transport(config, transport.clone(), clock.clone());
    TestApi {
        api,
        transport,
        clock,
    }
}

/// Full URL the client builds for a path, with the default base and version.
pub fn api_url(path: &str) -> String {
    format!(
        "{}/{}/{}",
        tasklink::constants::DEFAULT_BASE_URL,
        tasklink::constants::DEFAULT_API_VERSION,
        path
    )
}

/// Unwrap a JSON value into its object map; panics on anything else.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
