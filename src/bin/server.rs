//! `reservation-server`: binds a UDP socket and serves facility-reservation
//! requests until killed. A thin shell over [`facility_reservation::server`].

use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};

use facility_reservation::server::{run, Dispatcher, LossConfig, ServerState};
use facility_reservation::wire::MAX_DATAGRAM_SIZE;
use facility_reservation::InvocationSemantics;

#[derive(Parser, Debug)]
#[command(name = "reservation-server", about = "Facility-reservation UDP server")]
struct ServerArgs {
    /// UDP port to listen on.
    #[arg(long, default_value_t = 2222)]
    port: u16,

    /// Invocation semantics: whether the duplicate-reply cache is consulted.
    #[arg(long, value_enum, default_value_t = InvocationSemantics::AtMostOnce)]
    semantics: InvocationSemantics,

    /// Simulated probability (0.0-1.0) of dropping an outbound datagram.
    #[arg(long, default_value_t = 0.0)]
    loss: f64,

    /// Facility names this server manages. Repeatable: --facility A --facility B.
    #[arg(long = "facility", required = true)]
    facilities: Vec<String>,

    /// Maximum number of (client, requestId) duplicate-cache entries retained.
    #[arg(long, default_value_t = 4096)]
    dup_cache_capacity: usize,

    /// Maximum accepted datagram size in bytes.
    #[arg(long, default_value_t = MAX_DATAGRAM_SIZE)]
    max_datagram_size: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = ServerArgs::parse();
    facility_reservation::logger::init("server.log");

    let state = ServerState::new(args.facilities, args.dup_cache_capacity, args.semantics);
    let dispatcher = Dispatcher::new(state);
    let bind_addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), args.port);
    let loss = LossConfig { outbound_probability: args.loss, drop_inbound_too: false };

    log::info!("starting server on port {} with {} semantics", args.port, args.semantics);
    if let Err(e) = run(bind_addr, dispatcher, loss, args.max_datagram_size).await {
        log::error!("server terminated: {}", e);
        std::process::exit(1);
    }
}
