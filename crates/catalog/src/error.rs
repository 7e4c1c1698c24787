//! Errors raised by the catalog.
//!
//! - [`ApiError`] covers the remote collaborator (category listing and
//!   search). These are surfaced to the user as a message.
//! - [`StoreError`] covers the persisted filter slot. A read failure is never
//!   surfaced (the filter falls back to defaults) and a write failure is only
//!   logged.
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
