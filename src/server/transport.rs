//! The transport loop (spec.md §4.6): owns the one datagram endpoint,
//! hands received frames to the dispatcher, sends back whatever the
//! dispatcher produced. Optionally drops outbound (and, if configured,
//! inbound) datagrams to simulate packet loss for at-most-once /
//! at-least-once testing.
//!
//! Reads directly off the socket into a buffer sized to `max_datagram_size`
//! rather than through `tokio_util::udp::UdpFramed`: `UdpFramed`'s internal
//! read buffer grows to a fixed 64 KiB regardless of what the codec would
//! accept, so it cannot honor spec.md §5's requirement that the maximum
//! datagram size be a configurable resource bound. A raw, explicitly sized
//! buffer — the same approach `client::invoker` already uses on the
//! receiving side — enforces the bound at the point the datagram is read.

use rand::Rng;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

use crate::error::Result;
use crate::server::dispatcher::Dispatcher;

pub struct LossConfig {
    pub outbound_probability: f64,
    pub drop_inbound_too: bool,
}

impl LossConfig {
    pub fn none() -> Self {
        Self { outbound_probability: 0.0, drop_inbound_too: false }
    }
}

fn drop_trial(probability: f64) -> bool {
    probability > 0.0 && rand::rng().random::<f64>() < probability
}

/// Binds the endpoint and runs the single-threaded receive/dispatch/send
/// loop forever (spec.md §5: one logical task per datagram, run to
/// completion before the next is picked up). Datagrams larger than
/// `max_datagram_size` are truncated by the OS socket read the same way any
/// over-size read is; the dispatcher then sees a payload-length mismatch and
/// replies with the normal `BAD_REQUEST` path rather than silently dropping.
pub async fn run(bind_addr: SocketAddr, mut dispatcher: Dispatcher, loss: LossConfig, max_datagram_size: usize) -> Result<()> {
    let socket = UdpSocket::bind(bind_addr).await?;
    log::info!("listening on {} (max datagram size {} bytes)", bind_addr, max_datagram_size);
    let mut buf = vec![0u8; max_datagram_size];

    loop {
        let (n, from) = match socket.recv_from(&mut buf).await {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("failed to receive datagram: {}", e);
                continue;
            }
        };
        let datagram = &buf[..n];
        if n == max_datagram_size {
            log::warn!("datagram from {} filled the {}-byte read buffer; it may have been truncated", from, max_datagram_size);
        }

        if loss.drop_inbound_too && drop_trial(loss.outbound_probability) {
            log::debug!("simulated inbound packet loss from {}", from);
            continue;
        }

        for (target, reply) in dispatcher.handle_datagram(datagram, from) {
            if drop_trial(loss.outbound_probability) {
                log::debug!("simulated outbound packet loss to {}", target);
                continue;
            }
            if let Err(e) = socket.send_to(&reply, target).await {
                log::error!("failed to send datagram to {}: {}", target, e);
            }
        }
    }
}
