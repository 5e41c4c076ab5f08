use crate::protocol;
use futures::StreamExt;
use std::fmt;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use vantage_kernel::ViewpointMutator;

/// Log identity of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.0.to_string();
        f.write_str(&full[..8])
    }
}

/// How a connection ended.
#[derive(Debug)]
enum Closed {
    Peer(Option<String>),
    Shutdown,
    Transport(String),
}

impl fmt::Display for Closed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closed::Peer(Some(reason)) if !reason.is_empty() => write!(f, "closed by peer: {reason}"),
            Closed::Peer(_) => f.write_str("closed by peer"),
            Closed::Shutdown => f.write_str("server shutdown"),
            Closed::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// Serve one client until it leaves, fails, or the channel shuts down.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    mutator: ViewpointMutator,
    cancel: CancellationToken,
) {
    let id = ConnectionId::new();

    let handshake = tokio::select! {
        _ = cancel.cancelled() => return,
        result = tokio_tungstenite::accept_async(stream) => result,
    };
    let mut ws = match handshake {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!(%peer, %id, "websocket handshake failed: {e}");
            return;
        }
    };
    tracing::info!(%peer, %id, "connection open");

    // After a close frame arrives keep reading so the close reply is flushed;
    // the stream then ends with `None`.
    let mut peer_closed: Option<Option<String>> = None;
    let closed = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let frame = CloseFrame {
                    code: CloseCode::Away,
                    reason: "server shutting down".into(),
                };
                if let Err(e) = ws.close(Some(frame)).await {
                    tracing::debug!(%peer, %id, "close frame not delivered: {e}");
                }
                break Closed::Shutdown;
            }
            next = ws.next() => match next {
                Some(Ok(Message::Text(text))) => mutator.apply_discrete(protocol::decode(&text)),
                Some(Ok(Message::Binary(bytes))) => {
                    mutator.apply_discrete(protocol::decode_bytes(&bytes))
                }
                Some(Ok(Message::Close(frame))) => {
                    peer_closed = Some(frame.map(|f| f.reason.into_owned()));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if let Some(reason) = peer_closed.take() {
                        break Closed::Peer(reason);
                    }
                    break Closed::Transport(e.to_string());
                }
                None => break Closed::Peer(peer_closed.take().flatten()),
            }
        }
    };

    match &closed {
        Closed::Transport(_) => tracing::warn!(%peer, %id, "connection closed ({closed})"),
        _ => tracing::info!(%peer, %id, "connection closed ({closed})"),
    }
}
