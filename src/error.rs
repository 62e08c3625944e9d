//! Error conditions reported by the spatial entity store.
//!
//! None of these are fatal: the engine logs them and leaves state untouched,
//! since ids routinely go stale between a gesture starting and a delete landing.

use crate::types::{CardId, ConnectionId, ElementId};
use thiserror::Error;

/// Reasons a store operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    /// No card with this id exists.
    #[error("card {0} does not exist")]
    CardNotFound(CardId),
    /// No connection with this id exists.
    #[error("connection {0} does not exist")]
    ConnectionNotFound(ConnectionId),
    /// No free-form element with this id exists.
    #[error("element {0} does not exist")]
    ElementNotFound(ElementId),
    /// A connection may not start and end on the same card.
    #[error("cannot connect card {0} to itself")]
    SelfConnection(CardId),
}

/// Result alias for store operations.
pub type CanvasResult<T> = Result<T, CanvasError>;
