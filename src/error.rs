//! Error types.
//!
//! Every failure in the pipeline is recovered locally. The session logs the detailed error
//! and shows the user one of two coarse messages, picked by [`Error::status`].

use std::path::PathBuf;
use thiserror::Error;

use crate::notify::StatusMessage;
pub use crate::qrcode::EncodeError;

/// Failure to persist a rendered image.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The sink could not write the artifact (disk full, permission denied, ...).
    #[error("failed to write exported image")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// The image could not be encoded as PNG.
    #[error("failed to encode image as png")]
    Png {
        #[source]
        source: image::ImageError,
    },
}

/// An action that was refused before any work started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardViolation {
    /// Export was requested while the input text is blank.
    #[error("nothing to export: input text is blank")]
    BlankText,
}

/// Crate-wide error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Guard(#[from] GuardViolation),

    /// Configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// Configuration values the pipeline cannot work with.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The logging backend could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error comes from a refused action rather than a failure.
    pub fn is_guard(&self) -> bool {
        matches!(self, Self::Guard(_))
    }

    /// The status message shown to the user for this error.
    pub fn status(&self) -> StatusMessage {
        if self.is_guard() {
            StatusMessage::enter_something()
        } else {
            StatusMessage::something_went_wrong()
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        self.status().text
    }
}
