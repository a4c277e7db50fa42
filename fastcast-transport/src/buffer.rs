/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Receive buffers and the idle buffer pool.
//!
//! Every buffer the receiver ever uses is allocated once at start and then
//! cycles between the idle pool, the in-flight receive, the inbound queue,
//! and the consumer callback. Buffers are move-only: whoever holds the
//! [`RecvBuffer`] owns it, so no buffer can be in two places at once.

use std::fmt;

/// A fixed-capacity receive buffer with a mutable used length.
pub struct RecvBuffer {
    data: Box<[u8]>,
    used: usize,
}

impl RecvBuffer {
    /// Allocates a zeroed buffer of `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    /// Total capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes received into this buffer.
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Records how many bytes a receive filled, clamped to capacity.
    pub fn set_used(&mut self, used: usize) {
        debug_assert!(used <= self.data.len());
        self.used = used.min(self.data.len());
    }

    /// The received payload.
    #[must_use]
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// The whole buffer, for the socket to receive into.
    pub fn space_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl fmt::Debug for RecvBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecvBuffer")
            .field("capacity", &self.data.len())
            .field("used", &self.used)
            .finish()
    }
}

/// The set of buffers currently idle and ready for a receive.
///
/// Order is irrelevant to callers; `pop` never blocks and returns `None`
/// when every buffer is in flight or queued. Always accessed under the
/// receiver lock.
#[derive(Debug, Default)]
pub struct IdleBufferPool {
    buffers: Vec<RecvBuffer>,
}

impl IdleBufferPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns one buffer to the pool.
    pub fn push(&mut self, buffer: RecvBuffer) {
        self.buffers.push(buffer);
    }

    /// Returns a whole batch of buffers to the pool at once.
    pub fn push_all(&mut self, buffers: Vec<RecvBuffer>) {
        self.buffers.extend(buffers);
    }

    /// Takes a buffer, or `None` when none are idle.
    pub fn pop(&mut self) -> Option<RecvBuffer> {
        self.buffers.pop()
    }

    /// Number of idle buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffers are idle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_tracks_used_length() {
        let mut buffer = RecvBuffer::new(16);
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.used(), 0);

        buffer.space_mut()[..4].copy_from_slice(b"fast");
        buffer.set_used(4);
        assert_eq!(buffer.filled(), b"fast");
    }

    #[test]
    fn test_pool_cycles_buffers() {
        let mut pool = IdleBufferPool::new();
        assert!(pool.pop().is_none());

        pool.push(RecvBuffer::new(8));
        pool.push(RecvBuffer::new(8));
        assert_eq!(pool.len(), 2);

        let a = pool.pop().unwrap();
        let b = pool.pop().unwrap();
        assert!(pool.pop().is_none());

        pool.push_all(vec![a, b]);
        assert_eq!(pool.len(), 2);
        assert!(!pool.is_empty());
    }
}
