//! Request bodies (spec.md §4.1) and their encode/decode.

use crate::time_model::DateTime;
use crate::wire::cursor::Cursor;
use crate::wire::header::{Header, HEADER_LEN};
use crate::wire::operation::OperationType;
use crate::wire::protocol_error::ProtocolError;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Query { facility: String, days: Vec<u8> },
    Book { facility: String, start: DateTime, end: DateTime },
    Change { confirmation_id: String, offset_minutes: i32 },
    Monitor { facility: String, interval_minutes: i32 },
    Status,
    Extend { confirmation_id: String, extend_minutes: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub request_id: i32,
    pub body: RequestBody,
}

impl RequestBody {
    pub fn operation(&self) -> OperationType {
        match self {
            RequestBody::Query { .. } => OperationType::Query,
            RequestBody::Book { .. } => OperationType::Book,
            RequestBody::Change { .. } => OperationType::Change,
            RequestBody::Monitor { .. } => OperationType::Monitor,
            RequestBody::Status => OperationType::Status,
            RequestBody::Extend { .. } => OperationType::Extend,
        }
    }
}

/// What decoding a single datagram produced. Distinguishing `Dropped` from
/// `Invalid` is what lets the dispatcher implement spec.md §4.1's "drop only
/// on unparseable header, otherwise always reply" rule.
pub enum DecodeOutcome {
    /// Fewer than [`HEADER_LEN`] bytes were present — silently discard.
    Dropped,
    /// The header parsed; the body did not. `operation` is the raw wire byte
    /// so the caller can echo it back even if it names no known operation.
    Invalid { request_id: i32, operation: u8, error: ProtocolError },
    Ok(Request),
}

fn read_datetime(cur: &mut Cursor) -> Result<DateTime, ProtocolError> {
    let day = cur.read_i32()?;
    let hour = cur.read_i32()?;
    let minute = cur.read_i32()?;
    let to_u8 = |v: i32, max: i32, field: &str| -> Result<u8, ProtocolError> {
        if v < 0 || v > max {
            return Err(ProtocolError::BadRequest(format!("{} {} out of range", field, v)));
        }
        Ok(v as u8)
    };
    let day = to_u8(day, 7, "day")?;
    if day == 0 {
        return Err(ProtocolError::BadRequest("day 0 out of range".to_string()));
    }
    let hour = to_u8(hour, 23, "hour")?;
    let minute = to_u8(minute, 59, "minute")?;
    Ok(DateTime { day, hour, minute })
}

fn decode_body(operation: OperationType, payload: &[u8]) -> Result<RequestBody, ProtocolError> {
    let mut cur = Cursor::new(payload);
    match operation {
        OperationType::Query => {
            let facility = cur.read_string()?;
            let mut days = Vec::new();
            while cur.remaining() > 0 {
                let day = cur.read_i32()?;
                if !(1..=7).contains(&day) {
                    return Err(ProtocolError::BadRequest(format!("day code {} out of range 1..=7", day)));
                }
                days.push(day as u8);
            }
            if days.is_empty() {
                return Err(ProtocolError::BadRequest("QUERY requires at least one day".to_string()));
            }
            Ok(RequestBody::Query { facility, days })
        }
        OperationType::Book => {
            let facility = cur.read_string()?;
            let start = read_datetime(&mut cur)?;
            let end = read_datetime(&mut cur)?;
            Ok(RequestBody::Book { facility, start, end })
        }
        OperationType::Change => {
            let confirmation_id = cur.read_string()?;
            let offset_minutes = cur.read_i32()?;
            Ok(RequestBody::Change { confirmation_id, offset_minutes })
        }
        OperationType::Monitor => {
            let facility = cur.read_string()?;
            let interval_minutes = cur.read_i32()?;
            if interval_minutes <= 0 {
                return Err(ProtocolError::BadRequest("intervalMinutes must be > 0".to_string()));
            }
            Ok(RequestBody::Monitor { facility, interval_minutes })
        }
        OperationType::Status => Ok(RequestBody::Status),
        OperationType::Extend => {
            let confirmation_id = cur.read_string()?;
            let extend_minutes = cur.read_i32()?;
            Ok(RequestBody::Extend { confirmation_id, extend_minutes })
        }
    }
}

/// Decodes one complete datagram. Never panics; see [`DecodeOutcome`].
pub fn decode_request(datagram: &[u8]) -> DecodeOutcome {
    let header = match Header::decode(datagram) {
        Some(h) => h,
        None => return DecodeOutcome::Dropped,
    };
    let payload = &datagram[HEADER_LEN..];

    let declared_len = header.payload_length.max(0) as usize;
    if declared_len != payload.len() {
        return DecodeOutcome::Invalid {
            request_id: header.request_id,
            operation: header.operation,
            error: ProtocolError::BadRequest("declared payload length does not match datagram size".to_string()),
        };
    }

    let operation = match OperationType::from_u8(header.operation) {
        Some(op) => op,
        None => {
            return DecodeOutcome::Invalid {
                request_id: header.request_id,
                operation: header.operation,
                error: ProtocolError::BadRequest(format!("unknown operation code {}", header.operation)),
            }
        }
    };

    match decode_body(operation, payload) {
        Ok(body) => DecodeOutcome::Ok(Request { request_id: header.request_id, body }),
        Err(error) => DecodeOutcome::Invalid { request_id: header.request_id, operation: header.operation, error },
    }
}

fn encode_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn encode_datetime(out: &mut Vec<u8>, dt: DateTime) {
    out.extend_from_slice(&(dt.day as i32).to_be_bytes());
    out.extend_from_slice(&(dt.hour as i32).to_be_bytes());
    out.extend_from_slice(&(dt.minute as i32).to_be_bytes());
}

/// Encodes a client-originated request into a full datagram (header + body).
/// Used by the client REPL; the server only ever decodes requests.
pub fn encode_request(request_id: i32, body: &RequestBody) -> Vec<u8> {
    let mut payload = Vec::new();
    match body {
        RequestBody::Query { facility, days } => {
            encode_string(&mut payload, facility);
            for day in days {
                payload.extend_from_slice(&(*day as i32).to_be_bytes());
            }
        }
        RequestBody::Book { facility, start, end } => {
            encode_string(&mut payload, facility);
            encode_datetime(&mut payload, *start);
            encode_datetime(&mut payload, *end);
        }
        RequestBody::Change { confirmation_id, offset_minutes } => {
            encode_string(&mut payload, confirmation_id);
            payload.extend_from_slice(&offset_minutes.to_be_bytes());
        }
        RequestBody::Monitor { facility, interval_minutes } => {
            encode_string(&mut payload, facility);
            payload.extend_from_slice(&interval_minutes.to_be_bytes());
        }
        RequestBody::Status => {}
        RequestBody::Extend { confirmation_id, extend_minutes } => {
            encode_string(&mut payload, confirmation_id);
            payload.extend_from_slice(&extend_minutes.to_be_bytes());
        }
    }

    let header = Header { request_id, operation: body.operation().as_u8(), payload_length: payload.len() as i16 };
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    header.encode(&mut out);
    out.extend_from_slice(&payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(day: u8, hour: u8, minute: u8) -> DateTime {
        DateTime::new(day, hour, minute).unwrap()
    }

    #[test]
    fn round_trips_book_request() {
        let body = RequestBody::Book { facility: "GymA".to_string(), start: dt(1, 9, 0), end: dt(1, 10, 0) };
        let bytes = encode_request(7, &body);
        match decode_request(&bytes) {
            DecodeOutcome::Ok(req) => {
                assert_eq!(req.request_id, 7);
                assert_eq!(req.body, body);
            }
            _ => panic!("expected Ok"),
        }
    }

    #[test]
    fn round_trips_query_with_duplicate_days() {
        let body = RequestBody::Query { facility: "GymA".to_string(), days: vec![1, 1, 2] };
        let bytes = encode_request(1, &body);
        match decode_request(&bytes) {
            DecodeOutcome::Ok(req) => assert_eq!(req.body, body),
            _ => panic!("expected Ok"),
        }
    }

    #[test]
    fn truncated_header_is_dropped() {
        assert!(matches!(decode_request(&[0, 1, 2]), DecodeOutcome::Dropped));
    }

    #[test]
    fn unknown_operation_is_invalid_but_not_dropped() {
        let mut bytes = vec![0, 0, 0, 5, 99, 0, 0];
        let outcome = decode_request(&mut bytes);
        match outcome {
            DecodeOutcome::Invalid { request_id, operation, .. } => {
                assert_eq!(request_id, 5);
                assert_eq!(operation, 99);
            }
            _ => panic!("expected Invalid"),
        }
    }

    #[test]
    fn query_requires_at_least_one_day() {
        let mut payload = Vec::new();
        encode_string(&mut payload, "GymA");
        let header = Header { request_id: 1, operation: OperationType::Query.as_u8(), payload_length: payload.len() as i16 };
        let mut bytes = Vec::new();
        header.encode(&mut bytes);
        bytes.extend_from_slice(&payload);
        assert!(matches!(decode_request(&bytes), DecodeOutcome::Invalid { .. }));
    }
}
