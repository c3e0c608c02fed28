//! Error types for configuration, input, and solver consistency failures.
//!
//! Cooperative termination requested by an output proxy is *not* an error;
//! it is modelled as [`ControlFlow::Break`](std::ops::ControlFlow) from
//! [`OutputProxy::process_set`](crate::instance::OutputProxy::process_set).

use thiserror::Error;

/// All failure modes surfaced by the library.
#[derive(Debug, Error)]
pub enum DomsetError {
    /// A component was misconfigured: unknown name, missing required
    /// parameter, or a parameter value outside its domain.
    #[error("configuration error: {0}")]
    Config(String),

    /// A graph exceeded a compile-time limit (`MAX_VERTS` / `MAX_DEGREE`).
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Input text did not parse as the adjacency-list format.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The search state contradicted itself, e.g. a vertex reported covered
    /// before any dominator was placed. Indicates a driver or collaborator
    /// bug; aborts the current instance.
    #[error("inconsistent search state: {0}")]
    Inconsistent(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DomsetError>;
