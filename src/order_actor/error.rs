use thiserror::Error;

use crate::domain::InvalidTransition;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("Order code space exhausted")]
    CodeSpaceExhausted,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
