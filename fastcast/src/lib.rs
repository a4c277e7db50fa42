/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! # Fastcast
//!
//! A FAST (FIX Adapted for STreaming) presence-map codec and multicast
//! ingestion pipeline for Rust.
//!
//! FAST market-data feeds announce which optional fields each message
//! carries through a bit-packed, stop-bit delimited presence map. Fastcast
//! implements that side channel together with the receive path that feeds
//! it: a UDP multicast receiver with a fixed buffer pool and single-server
//! queueing, delivering packets in order to a consumer callback.
//!
//! ## Features
//!
//! - **Presence maps**: sequential write/check, random access, raw
//!   load/store, size-exact stop-bit encoding
//! - **Multicast ingestion**: bounded buffering with backpressure instead
//!   of drops, ordered delivery, at most one consumer callback at a time
//! - **Async support**: built on Tokio; `stop()` is callable from any
//!   thread and cancels the in-flight receive
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fastcast::prelude::*;
//! use std::net::Ipv4Addr;
//!
//! let config = MulticastConfig::new(Ipv4Addr::new(239, 255, 0, 1), 30001);
//! let mut receiver = MulticastReceiver::new(config);
//! receiver.start(MyConsumer::new())?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`codec`]: presence map, byte source/destination seams, error types
//! - [`transport`]: buffer pool, service queue, multicast receiver

pub mod codec {
    //! Presence map codec and byte-level I/O seams.
    pub use fastcast_codec::*;
}

pub mod transport {
    //! Buffer pool, service queue, and multicast receiver.
    pub use fastcast_transport::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Codec
    pub use fastcast_codec::{
        DataDestination, DataSource, FastError, PresenceMap, ReaderSource, SliceSource,
    };

    // Transport
    pub use fastcast_transport::{
        BufferConsumer, LogLevel, MulticastConfig, MulticastReceiver, ReceiverError, ReceiverStats,
    };
}
