/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Consumer callback interface.
//!
//! The receiver hands packets upward and reports lifecycle and error events
//! through this capability set. Implementations decide, via their boolean
//! returns, whether the receiver keeps running after a problem.

use fastcast_codec::FastError;

/// Importance ladder for consumer-directed log messages.
///
/// Low values are more important. The receiver asks
/// [`BufferConsumer::want_log`] before building a message, so consumers
/// that ignore logging pay nothing for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// The receiver cannot continue.
    Fatal = 0,
    /// An error that probably cost data.
    Serious = 1,
    /// An error the receiver recovered from.
    Warning = 2,
    /// Lifecycle events.
    Info = 3,
    /// Per-packet chatter.
    Verbose = 4,
}

/// Receives filled buffers and lifecycle events from a receiver.
///
/// `consume_buffer` is never called concurrently with itself, and packets
/// arrive in the order the socket delivered them. Callbacks may take
/// arbitrary time but must not call back into the receiver's `start`.
pub trait BufferConsumer: Send {
    /// Called once after the socket is set up, before any packet arrives.
    fn receiver_started(&mut self) {}

    /// Processes one UDP payload.
    ///
    /// # Returns
    /// `Ok(true)` to keep receiving, `Ok(false)` to request shutdown, or
    /// `Err` when the payload could not be decoded; the error is routed to
    /// [`report_decoding_error`](Self::report_decoding_error).
    fn consume_buffer(&mut self, payload: &[u8]) -> Result<bool, FastError>;

    /// Reports a socket-level failure, including cancellation at shutdown.
    ///
    /// # Returns
    /// `true` to keep receiving, `false` to request shutdown.
    fn report_communication_error(&mut self, message: &str) -> bool;

    /// Reports a failure raised while consuming a packet.
    ///
    /// # Returns
    /// `true` to keep receiving, `false` to request shutdown.
    fn report_decoding_error(&mut self, message: &str) -> bool;

    /// Whether the consumer wants log messages of `level`.
    fn want_log(&self, _level: LogLevel) -> bool {
        false
    }

    /// Delivers a log message the consumer asked for.
    fn log_message(&mut self, _level: LogLevel, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels_order_by_importance() {
        assert!(LogLevel::Fatal < LogLevel::Serious);
        assert!(LogLevel::Info < LogLevel::Verbose);
    }

    #[test]
    fn test_default_logging_hooks_are_quiet() {
        struct Quiet;
        impl BufferConsumer for Quiet {
            fn consume_buffer(&mut self, _payload: &[u8]) -> Result<bool, FastError> {
                Ok(true)
            }
            fn report_communication_error(&mut self, _message: &str) -> bool {
                true
            }
            fn report_decoding_error(&mut self, _message: &str) -> bool {
                true
            }
        }

        let mut quiet = Quiet;
        quiet.receiver_started();
        assert!(!quiet.want_log(LogLevel::Fatal));
        quiet.log_message(LogLevel::Info, "ignored");
    }
}
