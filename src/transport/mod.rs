//! Transport abstraction layer.
//!
//! This module defines the interface the API client speaks HTTP through,
//! along with the plain request/response types that cross it. Production
//! code uses [`HttpTransport`]; tests substitute a recording mock.

use std::fmt;

use serde_json::Value;

use crate::error::Result;

pub mod http;

pub use http::HttpTransport;

/// HTTP methods the API client issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file part of a multipart upload.
#[derive(Clone, Debug)]
pub struct FilePart {
    /// Form field name the part is sent under
    pub field: String,
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A fully resolved request, ready for a [`Transport`] to execute.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    /// Absolute URL including base, version, and path
    pub url: String,
    /// Query-string parameters
    pub params: Vec<(String, String)>,
    /// JSON body, already wrapped in the `data` envelope
    pub body: Option<Value>,
    /// File parts, sent as multipart when non-empty
    pub files: Vec<FilePart>,
}

/// A decoded-enough response: status, the headers the client cares about,
/// and the raw body text.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub retry_after: Option<String>,
    pub body: String,
}

impl Response {
    /// Whether the response declared an `application/json` content type,
    /// ignoring any parameters after `;`.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|value| value.split(';').next().unwrap_or("").trim() == "application/json")
            .unwrap_or(false)
    }
}

/// Transport trait the API client issues requests through.
///
/// Implementations are expected to be synchronous and blocking; retry and
/// response classification live above this seam, in the client.
pub trait Transport: Send + Sync {
    /// Execute a single request and return the raw response.
    fn execute(&self, request: &Request) -> Result<Response>;
}
