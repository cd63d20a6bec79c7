//! The server half of the protocol: dispatcher, shared state, and the
//! UDP transport loop (spec.md §4.5, §4.6).

pub mod dispatcher;
pub mod state;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use state::ServerState;
pub use transport::{run, LossConfig};
