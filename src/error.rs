//! Error types shared by every sweep.
//!
//! Collection failures abort a run before anything is written. Deletion and
//! pruning catch [`TidyError::RemoteService`] per item instead, so one bad
//! file or folder never stops the rest of the sweep.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TidyError {
    /// Any failure reported by the drive or spreadsheet backend.
    #[error("{operation} failed: {message}")]
    RemoteService { operation: String, message: String },

    /// Missing or unusable settings (root folder id, spreadsheet id, token).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A sheet does not have the shape the sweep expects.
    #[error("unexpected sheet layout: {0}")]
    DataShape(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TidyError {
    pub fn remote(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::RemoteService {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteService { .. })
    }
}

impl From<toml::de::Error> for TidyError {
    fn from(e: toml::de::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<toml::ser::Error> for TidyError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TidyError>;
