use std::sync::Arc;
use thiserror::Error;

use quottie_cache::CacheError;

/// Every way a data operation can fail, as far as callers are concerned
///
/// Closed set: transport and storage failures get folded into one of these
/// at the repository boundary and nothing else leaks out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoInternet,
    Serialization,
    ServerError,
    Unknown,
    AuthorizationError,
    RequestTimeout,
    Conflict,
    PayloadTooLarge,
    BadRequest,
    NotFound,
    TooManyRequests,
    Forbidden,
    /// The only kind that originates on the device
    DiskFull,
}

impl ErrorKind {
    pub fn is_local(self) -> bool {
        matches!(self, ErrorKind::DiskFull)
    }

    /// Stable key the presentation layer maps to a localized message
    pub fn message_key(self) -> &'static str {
        match self {
            ErrorKind::NoInternet => "error_no_internet",
            ErrorKind::Serialization => "error_unknown_error",
            ErrorKind::ServerError => "error_server_error",
            ErrorKind::Unknown => "error_unknown_error",
            ErrorKind::AuthorizationError => "error_authorization",
            ErrorKind::RequestTimeout => "error_the_request_timed_out",
            ErrorKind::Conflict => "error_conflict",
            ErrorKind::PayloadTooLarge => "error_file_too_large",
            ErrorKind::BadRequest => "error_bad_request",
            ErrorKind::NotFound => "error_not_found",
            ErrorKind::TooManyRequests => "error_youve_hit_your_rate_limit",
            ErrorKind::Forbidden => "error_forbidden",
            ErrorKind::DiskFull => "error_disk_full",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NoInternet => "no internet connection",
            ErrorKind::Serialization => "malformed payload",
            ErrorKind::ServerError => "server error",
            ErrorKind::Unknown => "unknown error",
            ErrorKind::AuthorizationError => "authorization error",
            ErrorKind::RequestTimeout => "request timeout",
            ErrorKind::Conflict => "conflict",
            ErrorKind::PayloadTooLarge => "payload too large",
            ErrorKind::BadRequest => "bad request",
            ErrorKind::NotFound => "not found",
            ErrorKind::TooManyRequests => "too many requests",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::DiskFull => "disk full",
        };
        f.write_str(name)
    }
}

type Cause = Arc<dyn std::error::Error + Send + Sync>;

/// A classified failure plus whatever caused it
///
/// Cheap to clone so paging can hold on to the last load error.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {cause}")]
pub struct DataError {
    kind: ErrorKind,
    #[source]
    cause: Cause,
}

impl DataError {
    pub fn new(kind: ErrorKind, cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            kind,
            cause: Arc::from(cause.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message_key(&self) -> &'static str {
        self.kind.message_key()
    }

    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

impl From<CacheError> for DataError {
    fn from(err: CacheError) -> Self {
        let kind = if err.is_disk_full() {
            ErrorKind::DiskFull
        } else {
            ErrorKind::Unknown
        };
        DataError::new(kind, err)
    }
}
