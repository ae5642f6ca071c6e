//! Error types for cqlsync
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using DriverError
pub type Result<T> = std::result::Result<T, DriverError>;

/// Unified error type for cqlsync operations
#[derive(Debug, Error)]
pub enum DriverError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// Transport-open failure, handshake rejection, or authentication failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// A transport read stalled past the configured socket timeout
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    /// PREPARE step rejected, batch misuse, or keyspace selection failure
    /// during the handshake
    #[error("Query error: {0}")]
    Query(String),

    /// ERROR-opcode response from the server during QUERY/EXECUTE/USE
    #[error("Cassandra error {code:#06x}: {message}")]
    Cassandra { code: i32, message: String },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DriverError {
    /// Classify a raw transport error per the codec's failure contract:
    /// timeouts become `ConnectionTimeout`, everything else `Connection`.
    pub(crate) fn from_transport(err: std::io::Error, context: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                DriverError::ConnectionTimeout(format!("{}: {}", context, err))
            }
            _ => DriverError::Connection(format!("{}: {}", context, err)),
        }
    }
}
