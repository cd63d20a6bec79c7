//! The fixed 7-byte header every datagram carries.
//!
//! Per spec.md §9 (Design Notes), the 8-byte `simulateLoss` variant seen in
//! one copy of the original C++ client is an artifact of a duplicated source
//! tree; the header implemented here is the 7-byte layout used by the shared
//! codec, and is the only one this crate ever emits or accepts.

pub const HEADER_LEN: usize = 7;

/// The raw header fields. `operation` is kept as the wire byte rather than a
/// validated [`OperationType`](crate::wire::OperationType) so that a reply to
/// an unrecognized operation code can still echo it back verbatim (see
/// `wire::codec::decode_request`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub request_id: i32,
    pub operation: u8,
    pub payload_length: i16,
}

impl Header {
    pub const PUSH_REQUEST_ID: i32 = -1;

    /// Reads the 7-byte header from the front of `buf`. Returns `None` if
    /// fewer than [`HEADER_LEN`] bytes are available — the only condition
    /// under which a datagram is silently dropped (spec.md §4.1).
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let request_id = i32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let operation = buf[4];
        let payload_length = i16::from_be_bytes([buf[5], buf[6]]);
        Some(Self { request_id, operation, payload_length })
    }

    pub fn encode(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.request_id.to_be_bytes());
        out.push(self.operation);
        out.extend_from_slice(&self.payload_length.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let h = Header { request_id: 42, operation: 2, payload_length: 10 };
        let mut buf = Vec::new();
        h.encode(&mut buf);
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(Header::decode(&buf), Some(h));
    }

    #[test]
    fn too_short_is_none() {
        assert_eq!(Header::decode(&[0, 1, 2]), None);
    }

    #[test]
    fn negative_request_id_round_trips() {
        let h = Header { request_id: -1, operation: 4, payload_length: 0 };
        let mut buf = Vec::new();
        h.encode(&mut buf);
        assert_eq!(Header::decode(&buf), Some(h));
    }
}
