//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("Unknown terrain code: {0:?}")]
    UnknownTerrain(String),

    #[error("Unknown species: {0:?}")]
    UnknownSpecies(String),

    #[error("Invalid parameter {key:?}: {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn invalid_parameter(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for every error raised by rejected configuration input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidMap(_)
                | Error::UnknownTerrain(_)
                | Error::UnknownSpecies(_)
                | Error::InvalidParameter { .. }
                | Error::Validation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
