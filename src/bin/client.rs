//! `reservation-client`: connects to a facility-reservation server and
//! drives it interactively. A thin shell over [`facility_reservation::client`].

use clap::Parser;
use std::net::{IpAddr, SocketAddr};

use facility_reservation::client::{repl, Invoker};
use facility_reservation::InvocationSemantics;

#[derive(Parser, Debug)]
#[command(name = "reservation-client", about = "Facility-reservation UDP client")]
struct ClientArgs {
    /// Server address to connect to.
    #[arg(long, default_value = "127.0.0.1")]
    server: IpAddr,

    /// Server UDP port.
    #[arg(long, default_value_t = 2222)]
    port: u16,

    /// Invocation semantics: at-most-once (no retransmit) or at-least-once.
    #[arg(long, value_enum, default_value_t = InvocationSemantics::AtMostOnce)]
    semantics: InvocationSemantics,

    /// Simulated probability (0.0-1.0) of dropping an outbound datagram.
    #[arg(long, default_value_t = 0.0)]
    loss: f64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = ClientArgs::parse();
    facility_reservation::logger::init("client.log");

    let server_addr = SocketAddr::new(args.server, args.port);
    let invoker = match Invoker::connect(server_addr, args.semantics, args.loss).await {
        Ok(invoker) => invoker,
        Err(e) => {
            log::error!("failed to connect to {}: {}", server_addr, e);
            std::process::exit(1);
        }
    };

    log::info!("connected to {} with {} semantics", server_addr, args.semantics);
    repl::run(invoker).await;
}
