//! Error types shared across the library.
//!
//! Every fallible operation in the crate returns [`Result`], so callers deal
//! with a single error enum whether the failure came from the transport, the
//! response payload, or a misuse of the entity layer.

/// Common error type for client and entity operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with a status we treat as a hard failure
    /// (4xx other than 404/429, or any 5xx).
    #[error("request to {url} returned status {status}")]
    Status { status: u16, url: String },

    /// A success response did not declare an `application/json` content type.
    #[error("did not receive JSON from the API at {url}")]
    NotJson { url: String },

    /// A success response decoded fine but had no top-level `data` key.
    #[error("response from {url} is missing the 'data' envelope")]
    MissingEnvelope { url: String },

    /// A rate-limited response lacked a positive `Retry-After` header.
    #[error("rate-limited response did not include a positive Retry-After")]
    InvalidRetryAfter,

    /// Too many consecutive 429 responses for a single request.
    #[error("gave up after {attempts} rate-limited attempts")]
    RetriesExhausted { attempts: u32 },

    /// A client-side filter key was absent from a result row.
    #[error("the key {key} is not a valid query for {kind}")]
    InvalidFilterKey { key: String, kind: &'static str },

    /// The operation needs an id but the instance has none.
    #[error("operation requires an id but none is set")]
    MissingId,

    /// Attempt to write a field the resource does not declare.
    #[error("cannot set unknown field {field} on {kind}")]
    UnknownField { field: String, kind: &'static str },

    /// Attempt to read a property that is neither stored, declared, nor a
    /// known relation.
    #[error("could not locate property {field} on {kind}")]
    UnknownProperty { field: String, kind: &'static str },

    /// The resource's identity cannot be derived from a URL path segment.
    #[error("cannot build a {0} from a resource link")]
    LinkUnsupported(&'static str),

    /// A task/section link operation found no project shared by both sides.
    #[error("task and section do not share a project")]
    NoCommonProject,

    /// A collection endpoint returned something other than a list of rows.
    #[error("expected a list of {kind} rows in the response payload")]
    UnexpectedPayload { kind: &'static str },

    /// The client was built from an unusable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
