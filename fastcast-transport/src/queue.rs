/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Inbound queue with a single-server service token.
//!
//! Producers (receive completions) push filled buffers; whichever thread
//! claims the service token drains them. The token transfer protocol in
//! [`end_service`] guarantees that no queued buffer lingers undrained while
//! also keeping the number of concurrent servicers at exactly zero or one.
//!
//! All calls happen under the receiver lock; the lock is released between
//! calls, so the servicer never holds it across a consumer callback.
//!
//! [`end_service`]: ServiceQueue::end_service

use crate::buffer::RecvBuffer;
use std::collections::VecDeque;

/// An ordered queue of filled buffers plus the service token.
#[derive(Debug, Default)]
pub struct ServiceQueue {
    queue: VecDeque<RecvBuffer>,
    in_service: bool,
}

impl ServiceQueue {
    /// Creates an empty, unserved queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filled buffer.
    ///
    /// # Returns
    /// `true` iff the queue just transitioned from empty-and-unserved to
    /// non-empty, i.e. a service opportunity was created and the caller
    /// should try to claim the token.
    pub fn push(&mut self, buffer: RecvBuffer) -> bool {
        let opportunity = self.queue.is_empty() && !self.in_service;
        self.queue.push_back(buffer);
        opportunity
    }

    /// Claims the service token if it is free.
    pub fn start_service(&mut self) -> bool {
        if self.in_service {
            return false;
        }
        self.in_service = true;
        true
    }

    /// Removes and returns the head buffer, or `None` when the queue is
    /// empty. Only the token holder may call this.
    pub fn service_next(&mut self) -> Option<RecvBuffer> {
        debug_assert!(self.in_service);
        self.queue.pop_front()
    }

    /// Ends (or extends) a service pass.
    ///
    /// With `want_continue` set and buffers still pending, the caller keeps
    /// the token and must drain again; otherwise the token is released so a
    /// later pusher can claim it.
    ///
    /// # Returns
    /// `true` iff the caller still holds the token.
    pub fn end_service(&mut self, want_continue: bool) -> bool {
        debug_assert!(self.in_service);
        if want_continue && !self.queue.is_empty() {
            return true;
        }
        self.in_service = false;
        false
    }

    /// Whether buffers are waiting to be drained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of buffers waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether some thread currently holds the service token.
    #[must_use]
    pub const fn in_service(&self) -> bool {
        self.in_service
    }
}
