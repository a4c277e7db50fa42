/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! FAST protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding FAST-encoded data.
///
/// The presence map itself never returns these: its failure channel is the
/// boolean result of [`PresenceMap::decode`](crate::PresenceMap::decode).
/// Consumers of decoded packets use this type to describe why a payload
/// could not be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FastError {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A presence map ended before its stop bit.
    #[error("truncated presence map")]
    TruncatedPresenceMap,

    /// The payload could not be interpreted as a FAST message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}
