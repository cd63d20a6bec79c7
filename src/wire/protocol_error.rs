//! The error taxonomy of spec.md §7. Every variant renders as the
//! `"ERROR: ..."` text that goes straight into a reply payload — this is
//! never a silent failure, only header-parse failures are dropped (§4.1).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    BadRequest(String),
    UnknownFacility(String),
    NotFound(String),
    Conflict,
    InvalidTime,
    Internal(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::BadRequest(detail) => write!(f, "ERROR: BAD_REQUEST: {}", detail),
            ProtocolError::UnknownFacility(name) => write!(f, "ERROR: UNKNOWN_FACILITY: {}", name),
            ProtocolError::NotFound(id) => write!(f, "ERROR: NOT_FOUND: {}", id),
            ProtocolError::Conflict => write!(f, "ERROR: CONFLICT"),
            ProtocolError::InvalidTime => write!(f, "ERROR: INVALID_TIME"),
            ProtocolError::Internal(detail) => write!(f, "ERROR: INTERNAL: {}", detail),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_invalid_time_have_no_trailing_detail() {
        assert_eq!(ProtocolError::Conflict.to_string(), "ERROR: CONFLICT");
        assert_eq!(ProtocolError::InvalidTime.to_string(), "ERROR: INVALID_TIME");
    }
}
