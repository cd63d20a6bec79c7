use std::net::SocketAddr;

/// A booked interval on one facility. `owner` is the transport address of
/// the client that made the booking request — diagnostics only, spec.md §3
/// is explicit that ownership is never enforced by this protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: String,
    pub facility: String,
    pub start_min: i32,
    pub end_min: i32,
    pub owner: SocketAddr,
}
