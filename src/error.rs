//! Error types for the chat connection.
//!
//! Configuration and store errors live next to their modules
//! (`ConfigError`, [`crate::db::DbError`]); `main` folds
//! everything into `anyhow::Error`.

use golem_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Connection Errors (chat transport)
// ============================================================================

/// Errors that end a chat session.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("no usable root certificates found")]
    NoRootCertificates,

    #[error("protocol error: {0}")]
    Protocol(ProtocolError),
}

impl From<ProtocolError> for ConnectionError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => ConnectionError::Io(e),
            other => ConnectionError::Protocol(other),
        }
    }
}

impl ConnectionError {
    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::NoRootCertificates => "no_root_certificates",
            Self::Protocol(_) => "protocol",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_inside_protocol_error_is_unwrapped() {
        let err: ConnectionError = ProtocolError::Io(std::io::Error::other("reset")).into();
        assert!(matches!(err, ConnectionError::Io(_)));
        assert_eq!(err.error_code(), "io");
    }

    #[test]
    fn other_protocol_errors_are_kept() {
        let err: ConnectionError = ProtocolError::IllegalControlChar('\0').into();
        assert_eq!(err.error_code(), "protocol");
    }
}
