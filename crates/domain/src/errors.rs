use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}
