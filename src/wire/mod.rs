//! The binary wire format of spec.md §4.1: header, request/reply bodies,
//! and the operation/error vocabularies they're built from.

pub mod cursor;
pub mod header;
pub mod operation;
pub mod protocol_error;
pub mod request;
pub mod response;

pub use header::{Header, HEADER_LEN};
pub use operation::OperationType;
pub use protocol_error::ProtocolError;
pub use request::{decode_request, encode_request, DecodeOutcome, Request, RequestBody};
pub use response::{decode_incoming, encode_push, encode_reply, Incoming};

pub const MAX_DATAGRAM_SIZE: usize = 1024;
