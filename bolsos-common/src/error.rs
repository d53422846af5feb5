//! Common error types for the bolsos services

use thiserror::Error;

/// Common result type for bolsos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the bolsos crates
///
/// Absence of a record is never an error here: the storage layer reports it
/// as `None` or `false`.
#[derive(Error, Debug)]
pub enum Error {
    /// A storage statement or connection failed
    ///
    /// For writes the transaction has already been rolled back by the time
    /// this is returned.
    #[error("Storage error during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A write statement succeeded but touched no row where one was required
    #[error("Storage error during {operation}: no row was written")]
    NothingWritten { operation: &'static str },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a driver error with the name of the storage operation that raised it
    pub fn storage(operation: &'static str, source: sqlx::Error) -> Self {
        Error::Storage { operation, source }
    }

    /// Name of the storage operation, if this is a storage failure
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Error::Storage { operation, .. } | Error::NothingWritten { operation } => {
                Some(operation)
            }
            _ => None,
        }
    }
}
