/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Receiver configuration.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Default maximum size of an incoming packet in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 1600;

/// Default number of receive buffers to allocate.
pub const DEFAULT_BUFFER_COUNT: usize = 2;

/// Configuration for a [`MulticastReceiver`](crate::MulticastReceiver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastConfig {
    /// IPv4 multicast group to join.
    pub group: Ipv4Addr,
    /// Interface to listen on; `0.0.0.0` lets the system choose.
    pub listen_interface: Ipv4Addr,
    /// UDP port to bind.
    pub port: u16,
    /// Maximum size of an incoming packet in bytes.
    pub buffer_size: usize,
    /// Number of receive buffers to allocate at start.
    pub buffer_count: usize,
}

impl MulticastConfig {
    /// Creates a configuration for `group`:`port` with default buffering,
    /// listening on any interface.
    #[must_use]
    pub const fn new(group: Ipv4Addr, port: u16) -> Self {
        Self {
            group,
            listen_interface: Ipv4Addr::UNSPECIFIED,
            port,
            buffer_size: DEFAULT_BUFFER_SIZE,
            buffer_count: DEFAULT_BUFFER_COUNT,
        }
    }

    /// Sets the interface whose address selects the multicast join.
    #[must_use]
    pub const fn with_listen_interface(mut self, interface: Ipv4Addr) -> Self {
        self.listen_interface = interface;
        self
    }

    /// Sets the maximum size of an incoming packet.
    #[must_use]
    pub const fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets the number of receive buffers to allocate at start.
    #[must_use]
    pub const fn with_buffer_count(mut self, count: usize) -> Self {
        self.buffer_count = count;
        self
    }
}
