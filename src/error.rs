//! Error types for the Falcon connector
//!
//! Every public API returns `Result<T, Error>`. Each error maps onto a stable
//! [`ErrorCode`] that is what callers (and the HTTP server) see on the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Caller Errors (never reach the network)
    // ============================================================================
    #[error("Invalid cursor: {message}")]
    InvalidCursor { message: String },

    #[error("Unsupported entity: {entity}")]
    UnsupportedEntity { entity: String },

    // ============================================================================
    // Datasource Errors
    // ============================================================================
    #[error("Datasource unreachable: {message}")]
    DatasourceUnreachable { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Datasource rejected the request with HTTP {status}: {body}")]
    DatasourceRejected { status: u16, body: String },

    #[error("Datasource failed with code {code}: {message}")]
    DatasourceFailed { code: String, message: String },

    // ============================================================================
    // Response Processing Errors
    // ============================================================================
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Failed to normalize attribute '{attribute}': {message}")]
    Normalize { attribute: String, message: String },

    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O and Generic Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Stable, externally visible error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    DatasourceUnreachable,
    DatasourceRejected,
    DatasourceFailed,
    InvalidCursor,
    UnsupportedEntity,
    InvalidConfig,
    InvalidResponse,
    Internal,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatasourceUnreachable => "DATASOURCE_UNREACHABLE",
            Self::DatasourceRejected => "DATASOURCE_REJECTED",
            Self::DatasourceFailed => "DATASOURCE_FAILED",
            Self::InvalidCursor => "INVALID_CURSOR",
            Self::UnsupportedEntity => "UNSUPPORTED_ENTITY",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create an invalid cursor error
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor {
            message: message.into(),
        }
    }

    /// Create an unsupported entity error
    pub fn unsupported_entity(entity: impl Into<String>) -> Self {
        Self::UnsupportedEntity {
            entity: entity.into(),
        }
    }

    /// Create an unreachable datasource error
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::DatasourceUnreachable {
            message: message.into(),
        }
    }

    /// Create a rejected request error
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::DatasourceRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a vendor failure error
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DatasourceFailed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a normalization error
    pub fn normalize(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Normalize {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Externally visible code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidCursor { .. } => ErrorCode::InvalidCursor,
            Error::UnsupportedEntity { .. } => ErrorCode::UnsupportedEntity,
            Error::DatasourceUnreachable { .. } | Error::Timeout { .. } => {
                ErrorCode::DatasourceUnreachable
            }
            Error::DatasourceRejected { .. } => ErrorCode::DatasourceRejected,
            Error::DatasourceFailed { .. } => ErrorCode::DatasourceFailed,
            Error::InvalidResponse { .. } | Error::Normalize { .. } | Error::JsonPath { .. } => {
                ErrorCode::InvalidResponse
            }
            Error::Config { .. } | Error::YamlParse(_) | Error::InvalidUrl(_) => {
                ErrorCode::InvalidConfig
            }
            Error::JsonParse(_) | Error::Io(_) | Error::Other(_) | Error::Anyhow(_) => {
                ErrorCode::Internal
            }
        }
    }

    /// Whether the caller may reasonably retry the same request
    ///
    /// This layer never retries; the hint is for the orchestrator.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::DatasourceUnreachable { .. } | Error::Timeout { .. } => true,
            Error::DatasourceRejected { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
