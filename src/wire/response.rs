//! Reply and monitor-push encoding/decoding (spec.md §4.1).
//!
//! Normal replies reuse the request's `operationType`/`requestId` and carry
//! their body as raw UTF-8 text (no length prefix — the payload length
//! bounds it). The monitor-push notification is the one exception: its body
//! is `2-byte nameLength | facility name bytes | UTF-8 availability text`.

use crate::wire::cursor::Cursor;
use crate::wire::header::{Header, HEADER_LEN};
use crate::wire::operation::OperationType;

pub fn encode_reply(request_id: i32, operation: u8, body: &str) -> Vec<u8> {
    let payload = body.as_bytes();
    let header = Header { request_id, operation, payload_length: payload.len() as i16 };
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    header.encode(&mut out);
    out.extend_from_slice(payload);
    out
}

pub fn encode_push(facility: &str, availability_text: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(facility.len() as u16).to_be_bytes());
    payload.extend_from_slice(facility.as_bytes());
    payload.extend_from_slice(availability_text.as_bytes());

    let header = Header { request_id: Header::PUSH_REQUEST_ID, operation: OperationType::Monitor.as_u8(), payload_length: payload.len() as i16 };
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    header.encode(&mut out);
    out.extend_from_slice(&payload);
    out
}

/// The two shapes a client can receive on its socket.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Reply { request_id: i32, operation: u8, body: String },
    Push { facility: String, body: String },
}

/// Decodes a datagram the client received. Returns `None` only if the
/// datagram is too short to even carry a header — the client simply ignores
/// such noise rather than erroring, since a malformed push/reply cannot be
/// attributed to any outstanding request.
pub fn decode_incoming(datagram: &[u8]) -> Option<Incoming> {
    let header = Header::decode(datagram)?;
    let payload = &datagram[HEADER_LEN..];
    let payload = if payload.len() as i16 != header.payload_length.max(0) { &[][..] } else { payload };

    if header.request_id == Header::PUSH_REQUEST_ID && header.operation == OperationType::Monitor.as_u8() {
        let mut cur = Cursor::new(payload);
        if let Ok(name_len) = cur.read_u16() {
            let name_len = name_len as usize;
            if payload.len() >= 2 + name_len {
                let facility = String::from_utf8_lossy(&payload[2..2 + name_len]).to_string();
                let body = String::from_utf8_lossy(&payload[2 + name_len..]).to_string();
                return Some(Incoming::Push { facility, body });
            }
        }
    }

    Some(Incoming::Reply { request_id: header.request_id, operation: header.operation, body: String::from_utf8_lossy(payload).to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_round_trips() {
        let bytes = encode_reply(3, OperationType::Book.as_u8(), "Booking Confirmation ID: GymA-1");
        match decode_incoming(&bytes) {
            Some(Incoming::Reply { request_id, operation, body }) => {
                assert_eq!(request_id, 3);
                assert_eq!(operation, OperationType::Book.as_u8());
                assert_eq!(body, "Booking Confirmation ID: GymA-1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn push_round_trips() {
        let bytes = encode_push("GymA", "Mon 09:00-10:00 busy");
        match decode_incoming(&bytes) {
            Some(Incoming::Push { facility, body }) => {
                assert_eq!(facility, "GymA");
                assert_eq!(body, "Mon 09:00-10:00 busy");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
