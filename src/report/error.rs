//! Report error types
//!
//! Every failure aborts the whole report; nothing is retried here.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while assembling a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Referenced entity (blade, client) does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Missing or malformed parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The record store could not be read
    #[error("Record store unavailable: {0}")]
    DependencyUnavailable(#[from] StoreError),

    /// A join target is missing (e.g. a ranked client without a name)
    #[error("Data consistency error: {0}")]
    DataConsistency(String),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;
