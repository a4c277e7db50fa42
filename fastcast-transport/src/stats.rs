/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Receiver statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters describing a receiver's lifetime.
///
/// Counters are readable from any thread at any time and never decrease.
/// Cross-thread reads are eventually consistent; a reader on the updating
/// thread always sees its own updates.
#[derive(Debug, Default)]
pub struct ReceiverStats {
    packets_received: AtomicU64,
    packets_queued: AtomicU64,
    batches_processed: AtomicU64,
    packets_processed: AtomicU64,
    error_packets: AtomicU64,
    empty_packets: AtomicU64,
    no_buffer_available: AtomicU64,
    bytes_received: AtomicU64,
    bytes_processed: AtomicU64,
    largest_packet: AtomicU64,
}

impl ReceiverStats {
    /// Packets whose receive completed, successfully or not.
    #[must_use]
    pub fn packets_received(&self) -> u64 {
        self.packets_received.load(Ordering::Relaxed)
    }

    /// Packets placed on the inbound queue.
    #[must_use]
    pub fn packets_queued(&self) -> u64 {
        self.packets_queued.load(Ordering::Relaxed)
    }

    /// Service passes over the inbound queue.
    #[must_use]
    pub fn batches_processed(&self) -> u64 {
        self.batches_processed.load(Ordering::Relaxed)
    }

    /// Packets drained from the inbound queue.
    #[must_use]
    pub fn packets_processed(&self) -> u64 {
        self.packets_processed.load(Ordering::Relaxed)
    }

    /// Receives that completed with an error, including cancellation.
    #[must_use]
    pub fn error_packets(&self) -> u64 {
        self.error_packets.load(Ordering::Relaxed)
    }

    /// Receives that completed with zero bytes.
    #[must_use]
    pub fn empty_packets(&self) -> u64 {
        self.empty_packets.load(Ordering::Relaxed)
    }

    /// Times no idle buffer was available to post a receive.
    #[must_use]
    pub fn no_buffer_available(&self) -> u64 {
        self.no_buffer_available.load(Ordering::Relaxed)
    }

    /// Payload bytes received from the socket.
    #[must_use]
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    /// Payload bytes delivered to the consumer.
    #[must_use]
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed.load(Ordering::Relaxed)
    }

    /// Size of the largest packet received so far.
    #[must_use]
    pub fn largest_packet(&self) -> u64 {
        self.largest_packet.load(Ordering::Relaxed)
    }

    pub(crate) fn on_receive_completed(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_packet_queued(&self, bytes: u64) {
        self.packets_queued.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
        self.largest_packet.fetch_max(bytes, Ordering::Relaxed);
    }

    pub(crate) fn on_error_packet(&self) {
        self.error_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_empty_packet(&self) {
        self.empty_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_no_buffer(&self) {
        self.no_buffer_available.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_batch_started(&self) {
        self.batches_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_packet_drained(&self) {
        self.packets_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_bytes_processed(&self, bytes: u64) {
        self.bytes_processed.fetch_add(bytes, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = ReceiverStats::default();
        stats.on_receive_completed();
        stats.on_packet_queued(100);
        stats.on_receive_completed();
        stats.on_packet_queued(40);
        stats.on_receive_completed();
        stats.on_empty_packet();

        assert_eq!(stats.packets_received(), 3);
        assert_eq!(stats.packets_queued(), 2);
        assert_eq!(stats.empty_packets(), 1);
        assert_eq!(stats.bytes_received(), 140);
        assert_eq!(stats.largest_packet(), 100);
    }
}
