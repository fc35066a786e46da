//! Tasklink - a typed entity-mapping client for Asana-style task APIs
//!
//! This library wraps a task-tracking REST service in typed resource
//! classes (projects, tasks, sections, users, ...) that fetch and filter
//! collections, lazily load missing fields and child relations, track local
//! mutations, and persist changes back through a thin blocking HTTP client
//! with rate-limit-aware retry and an optional response cache.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Configuration management (API key, cache, retry, logging)
//! * [`client`] - The API client: request building, classification, retry
//! * [`transport`] - HTTP transport seam and request/response types
//! * [`cache`] - Request-level response cache with TTL
//! * [`entity`] - Entity base: backing store, coercion, queries, persistence
//! * [`resources`] - Concrete resources: Project, Task, Section, Story, User, Tag
//! * [`logger`] - Console logging setup for consumers
//!
//! # Example
//!
//! ```no_run
//! use tasklink::{Api, Query, Resource};
//! use tasklink::resources::Task;
//!
//! fn main() -> tasklink::Result<()> {
//!     let api = Api::from_key("my-api-key")?;
//!     let urgent = Task::find(
//!         &api,
//!         Query::new()
//!             .eq("workspace", "12345")
//!             .test("name", |name| {
//!                 name.as_str().is_some_and(|n| n.contains("urgent"))
//!             }),
//!     )?;
//!     for task in urgent {
//!         println!("{}", task.name().unwrap_or("<unnamed>"));
//!     }
//!     Ok(())
//! }
//! ```

/// Request-level response cache and the clock abstraction behind it
pub mod cache;

/// API client issuing requests and interpreting responses
pub mod client;

/// Configuration module for managing client settings
pub mod config;

/// API endpoints, parameter names, and default values
pub mod constants;

/// Entity base machinery: backing store, queries, persistence
pub mod entity;

/// Error types shared across the library
pub mod error;

/// Logging utilities for consumers
pub mod logger;

/// Concrete resource variants
pub mod resources;

/// HTTP transport seam
pub mod transport;

// Re-export the handful of types almost every consumer touches
pub use client::Api;
pub use config::Config;
pub use entity::{Entity, FieldValue, Kind, Predicate, Query, Resource};
pub use error::{Error, Result};
