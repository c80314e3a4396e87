//! Error types for the conference API client.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers act
//! on them differently (drop a stale favorite, re-register the user). All
//! other non-2xx responses land in `HttpError` with the raw status code and
//! body. `Transport` only comes out of the executing layer; the pure
//! build/parse path never produces it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: unknown session, or nothing to delete.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the bearer token (401) or the payload's user (403).
    #[error("unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (DNS, refused, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Unauthorized { status } | ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
