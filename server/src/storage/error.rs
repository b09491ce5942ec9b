use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Environment not found: {0}")]
    NotFound(String),

    #[error("Environment already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid environment name: {0:?}")]
    InvalidName(String),
}
