//! The client half of the protocol: invocation semantics and the
//! interactive command loop (spec.md §4.7).

pub mod invoker;
pub mod repl;

pub use invoker::Invoker;
