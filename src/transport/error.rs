use std::fmt;

use crate::transport::transport::Endpoint;

#[derive(Debug)]
pub enum TransportError {
    /// HTTP client could not be constructed
    Client(reqwest::Error),

    /// Network failure or timeout while talking to an endpoint
    Request { endpoint: Endpoint, source: reqwest::Error },

    /// Endpoint answered with a non-2xx status and no usable body
    Status { endpoint: Endpoint, status: u16, body: String },

    /// Response body was not the expected JSON shape
    Decode { endpoint: Endpoint, source: serde_json::Error },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Client(source) => {
                write!(f, "Failed to build HTTP client: {}", source)
            }
            TransportError::Request { endpoint, source } => {
                write!(f, "Request to {} failed: {}", endpoint.path(), source)
            }
            TransportError::Status { endpoint, status, body } => {
                if body.is_empty() {
                    write!(f, "{} answered with HTTP {}", endpoint.path(), status)
                } else {
                    write!(f, "{} answered with HTTP {}: {}", endpoint.path(), status, body)
                }
            }
            TransportError::Decode { endpoint, source } => {
                write!(f, "Malformed response from {}: {}", endpoint.path(), source)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Client(source) => Some(source),
            TransportError::Request { source, .. } => Some(source),
            TransportError::Decode { source, .. } => Some(source),
            TransportError::Status { .. } => None,
        }
    }
}
