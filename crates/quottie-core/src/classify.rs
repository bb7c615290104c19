// Turns transport failures and HTTP responses into `DataError`s.
// Both functions are total: every input lands on exactly one kind.
// Nothing here retries; a retry is the caller re-running the same read.
use quottie_api::{RawResponse, TransportError};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;

use crate::{DataError, ErrorKind, Result};

/// Cause attached to errors built from a non-success status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (HTTP {status})")]
pub struct StatusError {
    pub status: u16,
    pub message: &'static str,
}

/// Classify a failure that happened before any response arrived
pub fn handle_error(error: TransportError) -> DataError {
    let kind = match &error {
        TransportError::UnresolvedHost(_) => ErrorKind::NoInternet,
        TransportError::Serialization(_) => ErrorKind::Serialization,
        TransportError::Timeout | TransportError::Io(_) => ErrorKind::ServerError,
        TransportError::Other(_) => ErrorKind::Unknown,
    };
    DataError::new(kind, error)
}

/// Classify a response by status; parse the body as `T` on 2xx
///
/// A 2xx body that fails to parse counts as `Unknown`, not `Serialization`:
/// the request itself went fine, the payload just isn't what we expected.
pub fn handle_response<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    let (kind, message) = match response.status {
        200..=299 => {
            return serde_json::from_str(&response.body)
                .map_err(|e| DataError::new(ErrorKind::Unknown, e));
        }
        401 => (ErrorKind::AuthorizationError, "Authorization error"),
        408 => (ErrorKind::RequestTimeout, "Request timeout"),
        409 => (ErrorKind::Conflict, "Conflict error"),
        413 => (ErrorKind::PayloadTooLarge, "Payload too large"),
        500..=599 => (ErrorKind::ServerError, "Server error"),
        _ => (ErrorKind::Unknown, "Unknown error"),
    };

    Err(DataError::new(
        kind,
        StatusError {
            status: response.status,
            message,
        },
    ))
}

/// Await a remote call and classify whatever comes back
pub async fn fetch_json<T, F>(call: F) -> Result<T>
where
    T: DeserializeOwned,
    F: Future<Output = std::result::Result<RawResponse, TransportError>>,
{
    match call.await {
        Ok(response) => handle_response(response),
        Err(error) => Err(handle_error(error)),
    }
}
