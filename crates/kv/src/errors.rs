//! Errors for the `veda-kv` crate.

/// A [Result] type alias where the error is [KvError].
pub type KvResult<T> = Result<T, KvError>;

/// An error type for [KeyValueStore] operations.
///
/// [KeyValueStore]: crate::KeyValueStore
#[derive(Debug, derive_more::Display, PartialEq, Eq)]
pub enum KvError {
    /// The underlying database rejected the operation.
    #[display("Database error: {_0}")]
    Database(String),
    /// The store could not be opened.
    #[display("Failed to open database at {path}: {message}")]
    Open {
        /// Path the store was opened at.
        path: String,
        /// Reason the open failed.
        message: String,
    },
}

impl core::error::Error for KvError {}

impl From<rocksdb::Error> for KvError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Database(err.into_string())
    }
}
