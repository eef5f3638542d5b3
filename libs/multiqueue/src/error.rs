use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Construction parameters were rejected. The queue has to be rebuilt with valid ones.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// `delete_min` found no items.
    #[error("queue is empty")]
    Empty,
}
