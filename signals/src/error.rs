use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("listeners of the cell were reset while waiting for a value")]
    Closed,
    #[error("disposable store was already disposed")]
    Disposed,
}

pub type Result<T> = std::result::Result<T, Error>;
