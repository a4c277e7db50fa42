/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! UDP multicast receiver.
//!
//! The receiver owns a small pool of receive buffers and keeps exactly one
//! asynchronous receive outstanding. Completed receives are pushed onto the
//! inbound queue, and whichever pass holds the queue's service token drains
//! the queue into the consumer. Buffers accumulate in a local batch while
//! draining and return to the pool in bulk, which applies backpressure to
//! the socket instead of dropping under load.
//!
//! One lock protects the pool, the queue, and the read-in-progress state;
//! it is never held across a consumer callback or a socket operation.

use crate::buffer::{IdleBufferPool, RecvBuffer};
use crate::config::MulticastConfig;
use crate::consumer::{BufferConsumer, LogLevel};
use crate::error::{ReceiverError, Result};
use crate::queue::ServiceQueue;
use crate::stats::ReceiverStats;
use parking_lot::Mutex;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// State protected by the receiver lock.
#[derive(Debug, Default)]
struct Shared {
    pool: IdleBufferPool,
    queue: ServiceQueue,
    read_in_progress: bool,
    /// Buffer claimed for the next receive but not yet handed to the socket.
    armed: Option<RecvBuffer>,
}

impl Shared {
    /// Claims a buffer for the next receive if none is in flight.
    ///
    /// Failing to find an idle buffer is not an error: every buffer release
    /// runs this again, so the next receive is posted as soon as one frees.
    fn start_receive(&mut self, stopping: bool, stats: &ReceiverStats) {
        if self.read_in_progress || stopping {
            return;
        }
        match self.pool.pop() {
            Some(buffer) => {
                self.read_in_progress = true;
                self.armed = Some(buffer);
            }
            None => stats.on_no_buffer(),
        }
    }
}

/// Control block shared between the receiver handle and its task.
#[derive(Debug)]
struct Control {
    shared: Mutex<Shared>,
    stopping: AtomicBool,
    stop_signal: Notify,
}

impl Control {
    fn new() -> Self {
        Self {
            shared: Mutex::new(Shared::default()),
            stopping: AtomicBool::new(false),
            stop_signal: Notify::new(),
        }
    }

    fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Relaxed)
    }

    fn request_stop(&self) {
        if !self.stopping.swap(true, Ordering::Relaxed) {
            debug!("multicast receiver stop requested");
        }
        self.stop_signal.notify_one();
    }
}

/// Receives multicast packets and hands them to a [`BufferConsumer`].
///
/// Construct with a [`MulticastConfig`], call [`start`](Self::start) with a
/// consumer, and call [`stop`](Self::stop) from any thread to shut down.
/// Statistics stay readable for the receiver's whole lifetime.
#[derive(Debug)]
pub struct MulticastReceiver {
    config: MulticastConfig,
    runtime: Option<tokio::runtime::Handle>,
    control: Arc<Control>,
    stats: Arc<ReceiverStats>,
    socket: Option<Arc<UdpSocket>>,
    task: Option<JoinHandle<()>>,
}

impl MulticastReceiver {
    /// Creates a receiver for `config`, to be driven by the current runtime.
    #[must_use]
    pub fn new(config: MulticastConfig) -> Self {
        Self {
            config,
            runtime: None,
            control: Arc::new(Control::new()),
            stats: Arc::new(ReceiverStats::default()),
            socket: None,
            task: None,
        }
    }

    /// Creates a receiver that spawns its receive task on `runtime`.
    #[must_use]
    pub fn with_runtime(config: MulticastConfig, runtime: tokio::runtime::Handle) -> Self {
        let mut receiver = Self::new(config);
        receiver.runtime = Some(runtime);
        receiver
    }

    /// Receiver statistics, shareable and readable at any time.
    #[must_use]
    pub fn stats(&self) -> Arc<ReceiverStats> {
        Arc::clone(&self.stats)
    }

    /// Local address the socket is bound to, once started.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref()?.local_addr().ok()
    }

    /// Opens the socket, joins the multicast group, and starts receiving.
    ///
    /// Allocates `buffer_count` buffers of `buffer_size` bytes, notifies
    /// the consumer that the receiver is up, and posts the first receive.
    /// Returns immediately; packets flow to the consumer from a spawned
    /// task.
    ///
    /// # Errors
    /// [`ReceiverError::AlreadyStarted`] on a second call,
    /// [`ReceiverError::InvalidConfig`] for a non-multicast group or empty
    /// buffering, or [`ReceiverError::Io`] when socket setup fails.
    pub fn start<C>(&mut self, mut consumer: C) -> Result<()>
    where
        C: BufferConsumer + 'static,
    {
        if self.task.is_some() {
            return Err(ReceiverError::AlreadyStarted);
        }
        self.validate_config()?;

        // Registering the socket with the reactor requires its runtime
        // context when one was supplied.
        let socket = {
            let _guard = self.runtime.as_ref().map(tokio::runtime::Handle::enter);
            Arc::new(self.open_socket()?)
        };

        {
            let mut shared = self.control.shared.lock();
            for _ in 0..self.config.buffer_count {
                shared.pool.push(RecvBuffer::new(self.config.buffer_size));
            }
        }

        consumer.receiver_started();
        if consumer.want_log(LogLevel::Info) {
            consumer.log_message(
                LogLevel::Info,
                &format!(
                    "joining multicast group {} via interface {}:{}",
                    self.config.group, self.config.listen_interface, self.config.port
                ),
            );
        }
        info!(
            group = %self.config.group,
            interface = %self.config.listen_interface,
            port = self.config.port,
            buffers = self.config.buffer_count,
            "multicast receiver started"
        );

        let run = run_receiver(
            Arc::clone(&self.control),
            Arc::clone(&self.stats),
            Arc::clone(&socket),
            consumer,
        );
        let task = match &self.runtime {
            Some(handle) => handle.spawn(run),
            None => tokio::spawn(run),
        };
        self.socket = Some(socket);
        self.task = Some(task);
        Ok(())
    }

    /// Requests shutdown and cancels the outstanding receive.
    ///
    /// Idempotent and callable from any thread, including from within a
    /// consumer callback. Decoding of the in-flight batch finishes first;
    /// later buffers in that batch are recycled without being delivered.
    pub fn stop(&self) {
        self.control.request_stop();
    }

    /// Waits for the receive task to finish after [`stop`](Self::stop).
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Approximately how many received bytes are waiting to be processed.
    ///
    /// Adds the bytes readable at the OS socket to the bytes received but
    /// not yet delivered to the consumer.
    #[must_use]
    pub fn bytes_readable(&self) -> u64 {
        let os_readable = self.socket.as_ref().map_or(0, |s| socket_readable(s));
        os_readable
            + self
                .stats
                .bytes_received()
                .saturating_sub(self.stats.bytes_processed())
    }

    fn validate_config(&self) -> Result<()> {
        if !self.config.group.is_multicast() {
            return Err(ReceiverError::InvalidConfig(format!(
                "{} is not a multicast group address",
                self.config.group
            )));
        }
        if self.config.buffer_count == 0 {
            return Err(ReceiverError::InvalidConfig(
                "buffer_count must be at least 1".to_string(),
            ));
        }
        if self.config.buffer_size == 0 {
            return Err(ReceiverError::InvalidConfig(
                "buffer_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Opens the UDP socket, sets `SO_REUSEADDR`, binds to the listen
    /// interface and port, and joins the multicast group through that
    /// interface.
    fn open_socket(&self) -> Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        let bind_addr = SocketAddrV4::new(self.config.listen_interface, self.config.port);
        socket.bind(&SocketAddr::V4(bind_addr).into())?;

        let socket: std::net::UdpSocket = socket.into();
        socket.join_multicast_v4(&self.config.group, &self.config.listen_interface)?;
        socket.set_nonblocking(true)?;
        Ok(UdpSocket::from_std(socket)?)
    }
}

impl Drop for MulticastReceiver {
    fn drop(&mut self) {
        self.control.request_stop();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Bytes readable on the socket according to the OS.
#[cfg(unix)]
fn socket_readable(socket: &UdpSocket) -> u64 {
    use std::os::fd::AsRawFd;
    let mut available: libc::c_int = 0;
    let rc = unsafe { libc::ioctl(socket.as_raw_fd(), libc::FIONREAD as _, &mut available) };
    if rc < 0 {
        0
    } else {
        available.max(0) as u64
    }
}

#[cfg(not(unix))]
fn socket_readable(_socket: &UdpSocket) -> u64 {
    0
}

/// The receive loop: keep one receive outstanding, queue completions, and
/// drain the queue whenever this pass claims the service token.
async fn run_receiver<C>(
    control: Arc<Control>,
    stats: Arc<ReceiverStats>,
    socket: Arc<UdpSocket>,
    mut consumer: C,
) where
    C: BufferConsumer + 'static,
{
    loop {
        let armed = {
            let mut shared = control.shared.lock();
            shared.start_receive(control.is_stopping(), &stats);
            shared.armed.take()
        };

        let Some(mut buffer) = armed else {
            if control.is_stopping() {
                break;
            }
            // Every buffer is queued: drain if the token is free, otherwise
            // wait for a stop request.
            let service = {
                let mut shared = control.shared.lock();
                !shared.queue.is_empty() && shared.queue.start_service()
            };
            if service {
                drain_queue(&control, &stats, &mut consumer);
            } else {
                control.stop_signal.notified().await;
            }
            continue;
        };

        let completion = tokio::select! {
            result = socket.recv_from(buffer.space_mut()) => result.map(|(bytes, _sender)| bytes),
            () = control.stop_signal.notified() => {
                Err(io::Error::new(io::ErrorKind::Interrupted, "receive canceled"))
            }
        };

        let service = handle_completion(&control, &stats, &mut consumer, buffer, completion);
        if service {
            drain_queue(&control, &stats, &mut consumer);
        }
        if control.is_stopping() {
            break;
        }
    }
    debug!("multicast receiver loop finished");
}

/// Books a completed receive under the lock and re-arms the socket.
///
/// # Returns
/// `true` when this pass claimed the service token and must drain.
fn handle_completion<C>(
    control: &Control,
    stats: &ReceiverStats,
    consumer: &mut C,
    mut buffer: RecvBuffer,
    completion: io::Result<usize>,
) -> bool
where
    C: BufferConsumer,
{
    let mut service = false;
    let mut shared = control.shared.lock();
    shared.read_in_progress = false;
    stats.on_receive_completed();
    match completion {
        Ok(0) => {
            // Empty packets happen; recycle the buffer.
            stats.on_empty_packet();
            shared.pool.push(buffer);
        }
        Ok(bytes) => {
            stats.on_packet_queued(bytes as u64);
            buffer.set_used(bytes);
            if shared.queue.push(buffer) {
                service = shared.queue.start_service();
            }
        }
        Err(err) => {
            stats.on_error_packet();
            shared.pool.push(buffer);
            warn!(error = %err, "receive completed with an error");
            if !consumer.report_communication_error(&err.to_string()) {
                control.request_stop();
            }
        }
    }
    // Keep the socket primed while this pass drains.
    shared.start_receive(control.is_stopping(), stats);
    service
}

/// Drains the queue while this pass holds the service token.
///
/// Consumer callbacks run without the receiver lock. Drained buffers
/// accumulate locally and return to the pool in one bulk push per batch.
fn drain_queue<C>(control: &Control, stats: &ReceiverStats, consumer: &mut C)
where
    C: BufferConsumer,
{
    let mut service = true;
    while service {
        stats.on_batch_started();
        let mut idle_batch = Vec::new();

        loop {
            let next = control.shared.lock().queue.service_next();
            let Some(buffer) = next else {
                break;
            };
            stats.on_packet_drained();
            if !control.is_stopping() {
                stats.on_bytes_processed(buffer.used() as u64);
                match consumer.consume_buffer(buffer.filled()) {
                    Ok(true) => {}
                    Ok(false) => control.request_stop(),
                    Err(err) => {
                        if !consumer.report_decoding_error(&err.to_string()) {
                            control.request_stop();
                        }
                    }
                }
            }
            idle_batch.push(buffer);
        }

        let mut shared = control.shared.lock();
        shared.pool.push_all(idle_batch);
        shared.start_receive(control.is_stopping(), stats);
        service = shared.queue.end_service(!control.is_stopping());
    }
}
