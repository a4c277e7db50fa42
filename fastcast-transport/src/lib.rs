/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! # Fastcast Transport
//!
//! UDP multicast ingestion pipeline for the fastcast engine.
//!
//! This crate provides:
//! - **Multicast receiver**: joins an IPv4 multicast group and hands
//!   received datagrams to a [`BufferConsumer`]
//! - **Buffer pool**: a fixed set of receive buffers cycling between the
//!   socket, the inbound queue, and the consumer
//! - **Single-server queue**: a service token guarantees at most one
//!   draining pass at any instant without a dedicated consumer thread
//!
//! Packets are delivered in the order the socket produced them, and
//! [`BufferConsumer::consume_buffer`] is never called concurrently with
//! itself. Backpressure comes from the bounded buffer pool: when every
//! buffer is busy the receiver stops posting receives until one returns.

pub mod buffer;
pub mod config;
pub mod consumer;
pub mod error;
pub mod queue;
pub mod receiver;
pub mod stats;

pub use buffer::{IdleBufferPool, RecvBuffer};
pub use config::{MulticastConfig, DEFAULT_BUFFER_COUNT, DEFAULT_BUFFER_SIZE};
pub use consumer::{BufferConsumer, LogLevel};
pub use error::{ReceiverError, Result};
pub use queue::ServiceQueue;
pub use receiver::MulticastReceiver;
pub use stats::ReceiverStats;
