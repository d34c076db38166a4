//! Common error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Request never produced a response (connect, DNS, timeout, reset)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response arrived with an unexpected status code
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Live channel error: {0}")]
    LiveChannel(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = Error::Status {
            status: 404,
            url: "http://camera.local/is_recording".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "http://camera.local/is_recording returned HTTP 404"
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(Error::Decode("bad".to_string()).status(), None);
    }
}
