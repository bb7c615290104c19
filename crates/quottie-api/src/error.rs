use thiserror::Error;

/// A response as it came off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that happen before a usable response exists
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Could not resolve host: {0}")]
    UnresolvedHost(String),

    #[error("Request timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Malformed payload: {0}")]
    Serialization(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout;
        }
        if err.is_decode() {
            return TransportError::Serialization(err.to_string());
        }
        if err.is_connect() {
            if is_dns_failure(&err) {
                return TransportError::UnresolvedHost(err.to_string());
            }
            return TransportError::Io(err.to_string());
        }
        if err.is_request() || err.is_body() {
            return TransportError::Io(err.to_string());
        }
        TransportError::Other(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialization(err.to_string())
    }
}

/// reqwest doesn't flag resolver failures, so walk the source chain
fn is_dns_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped(&'static str, Option<Box<Wrapped>>);

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_dns_failure_found_in_source_chain() {
        let err = Wrapped(
            "error sending request",
            Some(Box::new(Wrapped("dns error: failed to lookup address information", None))),
        );
        assert!(is_dns_failure(&err));
    }

    #[test]
    fn test_connection_refused_is_not_dns() {
        let err = Wrapped("error sending request", Some(Box::new(Wrapped("connection refused", None))));
        assert!(!is_dns_failure(&err));
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(299, "").is_success());
        assert!(!RawResponse::new(300, "").is_success());
        assert!(!RawResponse::new(404, "").is_success());
    }

    #[test]
    fn test_serde_error_becomes_serialization() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(TransportError::from(err), TransportError::Serialization(_)));
    }
}
