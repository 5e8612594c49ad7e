//! # Error Types
//!
//! Errors raised while parsing the shared vocabulary types. Registry and
//! derivation errors live in their own crates and wrap these.

use thiserror::Error;

/// Error constructing a core vocabulary value from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The category is not one of the five known component types.
    #[error("invalid component type: {0:?} (expected receiver, processor, exporter, extension or connector)")]
    InvalidComponentType(String),

    /// The version string is not a semantic version.
    #[error("invalid version {input:?}: {reason}")]
    InvalidVersion {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}
