//! Errors raised while loading snapshots and configuration.
//!
//! Evaluation itself never fails; see [`crate::diagnostics`].

use thiserror::Error;

use crate::circuit::ComponentId;

/// An input document could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is not valid JSON, or does not have the expected shape.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// A property read by a component's kind has the wrong type.
    #[error("invalid properties on component {component}: {source}")]
    InvalidProperties {
        /// The component whose properties were rejected.
        component: ComponentId,
        /// The underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
