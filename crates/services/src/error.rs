//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::session::SessionError;

/// Errors from the remote question/vehicle service.
///
/// Fetches are single-shot: a failure is surfaced to the caller, who may
/// start the exam again. No retry or backoff happens here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("exam API request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("vehicle {0} not found")]
    VehicleNotFound(String),
}

/// Errors from building the session question pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PoolError {
    #[error("no questions match the selected vehicle and topics")]
    Empty,
}

/// Errors emitted while starting or restarting an exam.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamFlowError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
