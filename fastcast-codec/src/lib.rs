/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! # Fastcast Codec
//!
//! FAST (FIX Adapted for STreaming) presence-map codec for the fastcast engine.
//!
//! FAST accompanies every message with a presence map: a bit-packed,
//! variable-length side channel that tells the decoder which optional fields
//! were actually transmitted. Each encoded byte carries seven payload bits
//! plus a stop bit that delimits the map on the wire.
//!
//! ## Features
//!
//! - **Presence maps**: sequential write/check, random access, raw load/store
//! - **Stop-bit framing**: size-exact encode with trailing-zero trimming
//! - **Byte-level seams**: [`DataSource`] and [`DataDestination`] traits
//!   decouple the codec from its input and output

pub mod destination;
pub mod error;
pub mod pmap;
pub mod source;

pub use destination::DataDestination;
pub use error::FastError;
pub use pmap::PresenceMap;
pub use source::{DataSource, ReaderSource, SliceSource};
