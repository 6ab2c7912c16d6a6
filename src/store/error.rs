//! Record store error types
//!
//! Defines all errors that can occur in the store layer.

use thiserror::Error;

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite reported a failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O operation failed (opening the database file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// Stored data could not be decoded (bad enum text, timestamp out of range)
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// Referenced blade does not exist
    #[error("Blade not found: {0}")]
    BladeNotFound(i64),

    /// Referenced blade exists but is deactivated
    #[error("Blade {0} is not active")]
    InactiveBlade(i64),

    /// Referenced sharpening record does not exist
    #[error("Sharpening record not found: {0}")]
    RecordNotFound(i64),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::BladeNotFound(42);
        assert_eq!(err.to_string(), "Blade not found: 42");

        let err = StoreError::InactiveBlade(7);
        assert_eq!(err.to_string(), "Blade 7 is not active");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let store_err: StoreError = sqlite_err.into();
        assert!(matches!(store_err, StoreError::Sqlite(_)));
    }
}
