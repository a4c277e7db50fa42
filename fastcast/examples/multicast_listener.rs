//! Multicast market-data listener example.
//!
//! Joins a multicast group, decodes the presence map at the head of every
//! packet, and reports receiver statistics once per second.
//!
//! Configuration comes from environment variables:
//! - `FASTCAST_GROUP` (default `239.255.0.1`)
//! - `FASTCAST_IFACE` (default `0.0.0.0`)
//! - `FASTCAST_PORT` (default `30001`)

use fastcast::prelude::*;
use std::env;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{error, info, warn};

const DEFAULT_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 0, 1);
const DEFAULT_PORT: u16 = 30001;

/// Counts packets and prints the head of each decoded presence map.
struct ListenerConsumer {
    decoded: u64,
}

impl BufferConsumer for ListenerConsumer {
    fn receiver_started(&mut self) {
        info!("receiver is up");
    }

    fn consume_buffer(&mut self, payload: &[u8]) -> Result<bool, FastError> {
        let mut source = SliceSource::new(payload);
        let mut pmap = PresenceMap::new(0);
        if !pmap.decode(&mut source) {
            return Err(FastError::TruncatedPresenceMap);
        }

        self.decoded += 1;
        let head: Vec<bool> = (0..7).map(|_| pmap.check_next_field()).collect();
        info!(
            packet = self.decoded,
            bytes = payload.len(),
            pmap_bytes = source.position(),
            pmap_head = ?head,
            "packet decoded"
        );
        Ok(true)
    }

    fn report_communication_error(&mut self, message: &str) -> bool {
        error!("communication error: {}", message);
        true
    }

    fn report_decoding_error(&mut self, message: &str) -> bool {
        warn!("decoding error: {}", message);
        true
    }

    fn want_log(&self, level: LogLevel) -> bool {
        level <= LogLevel::Info
    }

    fn log_message(&mut self, _level: LogLevel, text: &str) {
        info!("{}", text);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let group: Ipv4Addr = env::var("FASTCAST_GROUP")
        .ok()
        .and_then(|g| g.parse().ok())
        .unwrap_or(DEFAULT_GROUP);
    let interface: Ipv4Addr = env::var("FASTCAST_IFACE")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(Ipv4Addr::UNSPECIFIED);
    let port: u16 = env::var("FASTCAST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let config = MulticastConfig::new(group, port).with_listen_interface(interface);
    info!("listening for FAST packets on {}:{}", group, port);

    let mut receiver = MulticastReceiver::new(config);
    receiver.start(ListenerConsumer { decoded: 0 })?;

    let stats = receiver.stats();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            info!(
                "stats: received={} queued={} processed={} batches={} bytes={} largest={} starved={}",
                stats.packets_received(),
                stats.packets_queued(),
                stats.packets_processed(),
                stats.batches_processed(),
                stats.bytes_received(),
                stats.largest_packet(),
                stats.no_buffer_available(),
            );
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    receiver.stop();
    receiver.join().await;
    Ok(())
}

/// Initializes logging for the example.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
