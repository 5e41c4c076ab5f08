use std::net::SocketAddr;
use thiserror::Error;

/// Errors surfaced by the command channel to its owner.
///
/// Per-connection failures never show up here; they are logged and the
/// connection is dropped.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to start channel runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to bind command channel on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read bound address: {0}")]
    LocalAddr(#[source] std::io::Error),

    #[error("websocket client error: {0}")]
    Client(#[from] tokio_tungstenite::tungstenite::Error),
}
