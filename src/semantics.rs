//! The at-most-once / at-least-once vocabulary shared by the server
//! (gates whether the duplicate cache is consulted, spec.md §4.3) and the
//! client (gates retransmission, spec.md §4.7).

use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InvocationSemantics {
    #[value(name = "at-most-once")]
    AtMostOnce,
    #[value(name = "at-least-once")]
    AtLeastOnce,
}

impl fmt::Display for InvocationSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationSemantics::AtMostOnce => write!(f, "at-most-once"),
            InvocationSemantics::AtLeastOnce => write!(f, "at-least-once"),
        }
    }
}
