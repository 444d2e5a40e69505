//! Typed error types for the decoration manager.
//!
//! Callers at the crate boundary can match on these variants instead of
//! relying on opaque `anyhow` strings.

use term_decor_terminal::MarkerId;
use thiserror::Error;

/// Errors raised by the decoration registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A record already exists for this marker id and its marker is still
    /// alive. Ids may only be reused after the previous marker is disposed.
    #[error("marker {0} already has a live decoration record")]
    MarkerInUse(MarkerId),
}

/// Top-level error type for the decoration manager.
#[derive(Debug, Error)]
pub enum DecorationError {
    /// A command without a marker was passed to registration. This is a
    /// contract violation by the caller.
    #[error("cannot add a decoration for command {command:?} with no marker")]
    MissingMarker {
        /// Command text of the offending command.
        command: String,
    },

    /// The registry refused an insertion.
    #[error("decoration registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Writing to the clipboard failed.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}
