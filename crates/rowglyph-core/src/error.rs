//! Error types for the row synchronization engine.
//!
//! - [`ProviderError`] - failures reported by a site adapter while reading or
//!   writing the host page
//! - [`ConfigError`] - malformed embedded provider or icon data
//!
//! None of these are fatal to the engine. Provider errors are contained at
//! row granularity by the synchronizer.

use thiserror::Error;

/// Errors raised by a [`Provider`](crate::Provider) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// An element expected by a selector is absent
    #[error("selector matched nothing: {0}")]
    SelectorMiss(String),
    /// The host page rejected a DOM operation (row detached mid-pass, etc.)
    #[error("DOM operation rejected: {0}")]
    DomRejected(String),
    /// Window or document not available
    #[error("document not available")]
    MissingDocument,
    /// The one-time stylesheet rule could not be inserted
    #[error("failed to insert style rule: {0}")]
    StyleInsertion(String),
}

/// Errors raised while loading declarative configuration data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The document could not be deserialized
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    /// The document parsed but violates a constraint
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
