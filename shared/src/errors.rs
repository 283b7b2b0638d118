//! Shared error types for the deal synchronisation workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid UUID: {input}")]
    InvalidUuid { input: String },

    #[error("Invalid value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Logging setup failed: {message}")]
    LoggingError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
