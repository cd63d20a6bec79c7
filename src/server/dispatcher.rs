//! The request dispatcher (spec.md §4.5): decode, consult the duplicate
//! cache, execute against the schedule store, encode the reply, and enqueue
//! any monitor broadcasts the mutation triggers.

use std::net::SocketAddr;
use std::time::Instant;

use crate::semantics::InvocationSemantics;
use crate::server::state::ServerState;
use crate::time_model::format_boundary_aware;
use crate::wire::{decode_request, encode_push, encode_reply, DecodeOutcome, OperationType, ProtocolError, Request, RequestBody};

pub struct Dispatcher {
    pub state: ServerState,
}

impl Dispatcher {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Returns every outbound `(destination, bytes)` pair this datagram
    /// produced: the reply to `from` (unless the header was unparseable, in
    /// which case the datagram is silently dropped per spec.md §4.1), plus
    /// zero or more monitor-broadcast notifications.
    pub fn handle_datagram(&mut self, datagram: &[u8], from: SocketAddr) -> Vec<(SocketAddr, Vec<u8>)> {
        match decode_request(datagram) {
            DecodeOutcome::Dropped => Vec::new(),
            DecodeOutcome::Invalid { request_id, operation, error } => {
                let reply = encode_reply(request_id, operation, &error.to_string());
                if let Some(op) = OperationType::from_u8(operation) {
                    if op.is_mutating() && self.state.semantics == InvocationSemantics::AtMostOnce {
                        self.state.dup_cache.insert((from, request_id), op, reply.clone());
                    }
                }
                vec![(from, reply)]
            }
            DecodeOutcome::Ok(request) => self.handle_request(request, from),
        }
    }

    fn handle_request(&mut self, request: Request, from: SocketAddr) -> Vec<(SocketAddr, Vec<u8>)> {
        let operation = request.body.operation();
        let key = (from, request.request_id);
        let use_cache = operation.is_mutating() && self.state.semantics == InvocationSemantics::AtMostOnce;

        if use_cache {
            if let Some(cached) = self.state.dup_cache.get(&key) {
                return vec![(from, cached.to_vec())];
            }
        }

        let (body_text, broadcast_facility) = self.execute(&request.body, from);
        let reply = encode_reply(request.request_id, operation.as_u8(), &body_text);

        if use_cache {
            self.state.dup_cache.insert(key, operation, reply.clone());
        }

        let mut outputs = vec![(from, reply)];
        if let Some(facility) = broadcast_facility {
            outputs.extend(self.broadcast(&facility));
        }
        outputs
    }

    fn execute(&mut self, body: &RequestBody, from: SocketAddr) -> (String, Option<String>) {
        match body {
            RequestBody::Query { facility, days } => (self.state.schedule.query(facility, days).unwrap_or_else(|e| e.to_string()), None),

            RequestBody::Book { facility, start, end } => {
                match self.state.schedule.book(facility, start.to_minutes(), end.to_minutes(), from) {
                    Ok(id) => (format!("Booking Confirmation ID: {}", id), Some(facility.clone())),
                    Err(err) => (err.to_string(), None),
                }
            }

            RequestBody::Change { confirmation_id, offset_minutes } => match self.state.schedule.change(confirmation_id, *offset_minutes) {
                Ok((facility, start, end)) => {
                    (format!("Booking {} moved to {} - {}", confirmation_id, format_boundary_aware(start), format_boundary_aware(end)), Some(facility))
                }
                Err(err) => (err.to_string(), None),
            },

            RequestBody::Monitor { facility, interval_minutes } => {
                if !self.state.schedule.has_facility(facility) {
                    return (ProtocolError::UnknownFacility(facility.clone()).to_string(), None);
                }
                self.state.monitors.register(facility, from, *interval_minutes, Instant::now());
                (format!("Monitoring {} for {} minutes", facility, interval_minutes), None)
            }

            RequestBody::Status => (self.state.status_text(), None),

            RequestBody::Extend { confirmation_id, extend_minutes } => match self.state.schedule.extend(confirmation_id, *extend_minutes) {
                Ok((facility, start, end)) => {
                    (format!("Booking {} extended to {} - {}", confirmation_id, format_boundary_aware(start), format_boundary_aware(end)), Some(facility))
                }
                Err(err) => (err.to_string(), None),
            },
        }
    }

    /// spec.md §4.4: a fresh availability rendering covering all seven
    /// days, pushed to every non-expired subscriber of `facility`.
    fn broadcast(&mut self, facility: &str) -> Vec<(SocketAddr, Vec<u8>)> {
        let text = self.state.schedule.query(facility, &[1, 2, 3, 4, 5, 6, 7]).unwrap_or_default();
        let bytes = encode_push(facility, &text);
        self.state.monitors.targets(facility, Instant::now()).into_iter().map(|addr| (addr, bytes.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_model::DateTime;
    use crate::wire::encode_request;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(ServerState::new(["GymA".to_string()], 1024, InvocationSemantics::AtMostOnce))
    }

    fn book_request(request_id: i32, start_hour: u8, end_hour: u8) -> Vec<u8> {
        let start = DateTime::new(1, start_hour, 0).unwrap();
        let end = DateTime::new(1, end_hour, 0).unwrap();
        encode_request(request_id, &RequestBody::Book { facility: "GymA".to_string(), start, end })
    }

    #[test]
    fn duplicate_book_returns_identical_cached_reply() {
        let mut d = dispatcher();
        let client = addr(1);
        let req = book_request(1, 9, 10);

        let first = d.handle_datagram(&req, client);
        let second = d.handle_datagram(&req, client);

        assert_eq!(first[0].1, second[0].1);
        assert_eq!(d.state.schedule.reservation_count(), 1);
    }

    #[test]
    fn conflicting_book_replies_with_conflict_text() {
        let mut d = dispatcher();
        let client = addr(1);
        d.handle_datagram(&book_request(1, 9, 10), client);
        let outputs = d.handle_datagram(&book_request(2, 9, 10), client);

        let reply_text = String::from_utf8(outputs[0].1[crate::wire::HEADER_LEN..].to_vec()).unwrap();
        assert_eq!(reply_text, "ERROR: CONFLICT");
    }

    #[test]
    fn monitor_then_book_triggers_broadcast_to_subscriber() {
        let mut d = dispatcher();
        let monitor_client = addr(7);
        let booking_client = addr(1);

        let monitor_req = encode_request(7, &RequestBody::Monitor { facility: "GymA".to_string(), interval_minutes: 10 });
        d.handle_datagram(&monitor_req, monitor_client);

        let outputs = d.handle_datagram(&book_request(2, 11, 12), booking_client);
        // [0] is the reply to the booker, [1] is the broadcast to the monitor subscriber.
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[1].0, monitor_client);

        let header = crate::wire::Header::decode(&outputs[1].1).unwrap();
        assert_eq!(header.request_id, -1);
        assert_eq!(header.operation, OperationType::Monitor.as_u8());
        let body = String::from_utf8(outputs[1].1[crate::wire::HEADER_LEN..].to_vec()).unwrap();
        assert!(body.contains("GymA"));
    }

    #[test]
    fn replayed_monitor_does_not_duplicate_subscription() {
        let mut d = dispatcher();
        let client = addr(7);
        let monitor_req = encode_request(7, &RequestBody::Monitor { facility: "GymA".to_string(), interval_minutes: 10 });

        d.handle_datagram(&monitor_req, client);
        d.handle_datagram(&monitor_req, client);

        assert_eq!(d.state.monitors.total_subscriptions(Instant::now()), 1);
    }

    #[test]
    fn unknown_facility_book_is_rejected_without_mutating_state() {
        let mut d = dispatcher();
        let req = encode_request(
            1,
            &RequestBody::Book { facility: "GymZ".to_string(), start: DateTime::new(1, 9, 0).unwrap(), end: DateTime::new(1, 10, 0).unwrap() },
        );
        d.handle_datagram(&req, addr(1));
        assert_eq!(d.state.schedule.reservation_count(), 0);
    }

    #[test]
    fn truncated_header_produces_no_output() {
        let mut d = dispatcher();
        assert!(d.handle_datagram(&[0, 1], addr(1)).is_empty());
    }

    #[test]
    fn status_bypasses_duplicate_cache() {
        let mut d = dispatcher();
        let req = encode_request(1, &RequestBody::Status);
        d.handle_datagram(&req, addr(1));
        assert!(d.state.dup_cache.is_empty());
    }
}
