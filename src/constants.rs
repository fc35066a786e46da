//! Constants used throughout the library
//!
//! This module centralizes API endpoints, configuration defaults, and other
//! constant values to improve maintainability and consistency.

/// Base URL of the task-tracking service API
pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api";
/// API version segment appended to the base URL
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Request parameter naming the fields the server should include in payloads
pub const OPT_FIELDS_PARAM: &str = "opt_fields";
/// Top-level key wrapping every request and response payload
pub const DATA_ENVELOPE: &str = "data";

/// Maximum number of consecutive rate-limited attempts before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Environment variable consulted for the API key when the config omits it
pub const ENV_API_KEY: &str = "TASKLINK_API_KEY";
/// Directory under the platform config root holding our configuration
pub const CONFIG_DIR_NAME: &str = "tasklink";
/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";
