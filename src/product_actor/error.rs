use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Invalid product: {0}")]
    Invalid(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
