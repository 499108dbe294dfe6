//! Error types for routing.

use thiserror::Error;

use crate::request::Method;

/// Router-specific errors.
///
/// Everything except [`RouterError::MissingParameter`] is raised while the
/// router is being configured and aborts the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The path pattern has a bad shape.
    #[error("malformed path pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// Another route was already registered under this id.
    #[error("duplicate route id: {0}")]
    DuplicateId(String),

    /// Another route already answers this path, method and version.
    #[error("route `{id}` collides with `{existing}` on {method} {path}{}", version_suffix(.version))]
    DuplicateRoute {
        id: String,
        existing: String,
        method: Method,
        path: String,
        version: Option<String>,
    },

    /// A reverse lookup was missing a value for a path parameter.
    #[error("missing value for parameter `{name}` when linking to `{id}`")]
    MissingParameter { id: String, name: String },
}

impl RouterError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

fn version_suffix(version: &Option<String>) -> String {
    version
        .as_ref()
        .map(|v| format!(" (version {v})"))
        .unwrap_or_default()
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
