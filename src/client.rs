//! API client: request building, response classification, retry, caching.
//!
//! [`Api`] is the one handle the entity layer talks to. It joins the base
//! URL, version, and path into a target, signs the request through the
//! transport, and interprets the result:
//!
//! * 2xx with an `application/json` body → the unwrapped `data` payload
//! * 404 → `Value::Null` (a non-error, empty-equivalent outcome)
//! * 429 → sleep for the server-specified `Retry-After` and re-issue, up to
//!   a bounded number of attempts
//! * anything else → a hard [`Error::Status`]
//!
//! GET responses flow through the request cache when one is configured, and
//! dry-run mode short-circuits every non-GET method before it reaches the
//! network.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::cache::{Clock, RequestCache, SystemClock};
use crate::config::Config;
use crate::constants::DATA_ENVELOPE;
use crate::error::{Error, Result};
use crate::transport::{FilePart, HttpTransport, Method, Request, Response, Transport};

/// Shared handle for all API traffic.
///
/// Cheap to pass by reference; the entity layer takes `&Api` on every query
/// and persistence call instead of holding global state.
pub struct Api {
    config: Config,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    cache: Option<Mutex<RequestCache>>,
}

impl Api {
    /// Build a client from a full configuration, using the real HTTP
    /// transport and wall clock.
    pub fn new(config: Config) -> Result<Self> {
        if config.api.key.is_empty() {
            return Err(Error::Config("api key is not set".to_string()));
        }
        let transport = Arc::new(HttpTransport::new(config.api.key.clone())?);
        Ok(Self::with_transport(config, transport, Arc::new(SystemClock)))
    }

    /// Convenience constructor: default configuration plus an API key.
    pub fn from_key(key: impl Into<String>) -> Result<Self> {
        let mut config = Config::default();
        config.api.key = key.into();
        Self::new(config)
    }

    /// Build a client over an explicit transport and clock. This is the
    /// seam tests use to script responses and observe sleeps.
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = config
            .cache
            .requests
            .is_enabled()
            .then(|| Mutex::new(RequestCache::new(config.cache.requests.lifetime())));
        Self {
            config,
            transport,
            clock,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api.base_url.trim_end_matches('/'),
            self.config.api.version,
            path.trim_start_matches('/')
        )
    }

    /// Perform a GET request, consulting the cache first when enabled.
    pub fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.url_for(path);
        let key = RequestCache::key(Method::Get, &url, params, None, &[]);

        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                if let Some(value) = cache.lookup(&key, self.clock.as_ref()) {
                    debug!("cache hit for {url}");
                    return Ok(value);
                }
            }
        }

        let value = self.request(Method::Get, url, params.to_vec(), None, Vec::new())?;

        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.store(key, value.clone(), self.clock.as_ref());
            }
        }

        Ok(value)
    }

    /// Perform a POST request with a JSON payload.
    pub fn post(&self, path: &str, data: Value) -> Result<Value> {
        self.send_payload(Method::Post, path, Some(data), Vec::new())
    }

    /// Perform a POST request carrying file uploads next to the payload.
    pub fn post_with_files(
        &self,
        path: &str,
        data: Option<Value>,
        files: Vec<FilePart>,
    ) -> Result<Value> {
        self.send_payload(Method::Post, path, data, files)
    }

    /// Perform a PUT request with a JSON payload.
    pub fn put(&self, path: &str, data: Value) -> Result<Value> {
        self.send_payload(Method::Put, path, Some(data), Vec::new())
    }

    /// Perform a DELETE request.
    pub fn delete(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        self.request(Method::Delete, url, Vec::new(), None, Vec::new())
    }

    fn send_payload(
        &self,
        method: Method,
        path: &str,
        data: Option<Value>,
        files: Vec<FilePart>,
    ) -> Result<Value> {
        let url = self.url_for(path);
        let body = data.map(|payload| {
            let mut envelope = Map::new();
            envelope.insert(DATA_ENVELOPE.to_string(), payload);
            Value::Object(envelope)
        });
        self.request(method, url, Vec::new(), body, files)
    }

    fn request(
        &self,
        method: Method,
        url: String,
        params: Vec<(String, String)>,
        body: Option<Value>,
        files: Vec<FilePart>,
    ) -> Result<Value> {
        debug!("{method} {url}");
        if !params.is_empty() {
            debug!("  params => {params:?}");
        }
        if let Some(body) = &body {
            debug!("  data => {body}");
        }

        if self.config.http.dry_run && method != Method::Get {
            debug!("dry run, skipping {method} {url}");
            return Ok(Value::Object(Map::new()));
        }

        let request = Request {
            method,
            url,
            params,
            body,
            files,
        };

        let mut rate_limited = 0u32;
        loop {
            let response = self.transport.execute(&request)?;
            debug!("-> got {}", response.status);

            match response.status {
                200..=299 => return self.decode(&request, response),
                404 => return Ok(Value::Null),
                429 => {
                    rate_limited += 1;
                    if rate_limited > self.config.http.max_retries {
                        return Err(Error::RetriesExhausted {
                            attempts: rate_limited,
                        });
                    }
                    let seconds = retry_after_seconds(&response)?;
                    warn!("rate limited, sleeping {seconds}s before retrying {}", request.url);
                    self.clock.sleep(Duration::from_secs(seconds));
                }
                status => {
                    return Err(Error::Status {
                        status,
                        url: request.url.clone(),
                    })
                }
            }
        }
    }

    fn decode(&self, request: &Request, response: Response) -> Result<Value> {
        if !response.is_json() {
            return Err(Error::NotJson {
                url: request.url.clone(),
            });
        }

        let payload: Value = serde_json::from_str(&response.body)?;
        match payload.get(DATA_ENVELOPE) {
            Some(data) => Ok(data.clone()),
            None => Err(Error::MissingEnvelope {
                url: request.url.clone(),
            }),
        }
    }
}

/// Seconds to wait before re-issuing a rate-limited request. The header is
/// required and must be a positive integer.
fn retry_after_seconds(response: &Response) -> Result<u64> {
    response
        .retry_after
        .as_deref()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|seconds| *seconds > 0)
        .ok_or(Error::InvalidRetryAfter)
}
