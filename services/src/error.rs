use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("service '{0}' is not registered")]
    NotRegistered(&'static str),
    #[error("cycle detected: {0}")]
    Cycle(String),
    #[error("service '{0}' was registered with a different type")]
    TypeMismatch(&'static str),
    #[error("'{service}' requested '{dependency}' without declaring it as a dependency")]
    Undeclared { service: &'static str, dependency: &'static str },
    #[error("failed to create service '{name}'")]
    Factory {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
