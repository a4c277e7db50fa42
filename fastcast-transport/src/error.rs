/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Error types for the fastcast transport layer.

use thiserror::Error;

/// Result type alias using [`ReceiverError`] as the error type.
pub type Result<T> = std::result::Result<T, ReceiverError>;

/// Errors that can occur while setting up or running a receiver.
///
/// Once a receiver is running, failures on the socket are reported through
/// the consumer's error callbacks rather than through this type; the
/// receiver itself never panics or terminates the process.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// I/O error while opening, binding, or joining the socket.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The receiver was already started.
    #[error("receiver already started")]
    AlreadyStarted,

    /// The configuration cannot describe a working receiver.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReceiverError::InvalidConfig("buffer_count must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: buffer_count must be at least 1"
        );
    }
}
