use thiserror::Error;

use crate::{BusName, Endpoint};

/// Failures reported by bus collaborators.
///
/// None of these are fatal to the core: callers log them and degrade to
/// "no data" (menu unavailable, proxy disconnected).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The name currently has no owner on the bus.
    #[error("name {0} has no owner")]
    NameHasNoOwner(BusName),
    /// No object is exported at the endpoint.
    #[error("no object exported at {0}")]
    NoSuchObject(Endpoint),
    /// The bus connection itself is unavailable.
    #[error("bus connection unavailable")]
    Disconnected,
    /// A remote call failed.
    #[error("{method} failed: {message}")]
    Call {
        /// Remote method name.
        method: String,
        /// Error text returned by the peer.
        message: String,
    },
}
