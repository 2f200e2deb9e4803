//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A template produced a pattern the regex engine rejected, or carried an empty
    /// capture name.
    #[error("invalid path pattern {template:?}: {message}")]
    InvalidPattern {
        /// The template as registered.
        template: String,
        /// What was wrong with it.
        message: String,
    },

    /// A character in the template is not accepted by any token grammar.
    #[error("unexpected token in path pattern {template:?} at offset {offset}")]
    UnexpectedToken {
        /// The template as registered.
        template: String,
        /// Byte offset of the first rejected character.
        offset: usize,
    },

    /// The same capture name appears more than once in a template.
    #[error("duplicate capture name {name:?} in path pattern {template:?}")]
    DuplicateCapture {
        /// The template as registered.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// A route matched structurally but produced a different number of groups than it
    /// declares captures. The route is skipped.
    #[error("parameter mismatch with regexp {pattern:?}: declared {declared}, captured {captured}")]
    CaptureMismatch {
        /// The compiled matching pattern.
        pattern: String,
        /// Number of capture names declared by the template.
        declared: usize,
        /// Number of groups the pattern produced.
        captured: usize,
    },

    /// The method token is not one the router serves.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A required path parameter was not captured.
    #[error("missing path parameter: {0}")]
    MissingParam(String),

    /// The router configuration could not be parsed.
    #[error("invalid router configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
