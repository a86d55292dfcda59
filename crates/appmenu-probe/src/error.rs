//! Error handling for the appmenu-probe crate.

use std::result;

use appmenu_variant::{ParseError, SignatureError};
use thiserror::Error;

/// Convenient result type for probe operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running the probe.
#[derive(Debug, Error)]
pub enum Error {
    /// Variant text did not parse.
    #[error("cannot parse variant text: {0}")]
    Parse(#[from] ParseError),
    /// A type string did not parse.
    #[error("invalid type string: {0}")]
    Signature(#[from] SignatureError),
    /// Configuration parsing or resolution errors.
    #[error("{}", .0.pretty())]
    Config(#[from] appmenu_config::Error),
    /// JSON rendering failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Generic error for unexpected conditions.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Helper for wrapping generic string errors.
    pub fn other<M: Into<String>>(msg: M) -> Self {
        Self::Other(msg.into())
    }
}
