use thiserror::Error;

/// Infrastructure-level failures: things that keep the server or client from
/// running at all, as opposed to [`ProtocolError`](crate::wire::ProtocolError)
/// which is a normal, wire-visible reply.
#[derive(Debug, Error)]
pub enum Error {
    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind facility set: {0}")]
    Config(String),

    #[error("client gave up waiting for a reply: {0}")]
    NoReply(String),
}

pub type Result<T> = std::result::Result<T, Error>;
