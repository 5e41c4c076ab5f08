use crate::connection::handle_connection;
use crate::error::ChannelError;
use std::net::SocketAddr;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use vantage_kernel::ViewpointMutator;

/// How long open connections get to finish their close handshake on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Pause after a failed `accept` (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept connections until `cancel` fires, then close every open connection.
///
/// Each connection runs as its own task holding a clone of `mutator`.
pub async fn serve(listener: TcpListener, mutator: ViewpointMutator, cancel: CancellationToken) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted tcp connection");
                    connections.spawn(handle_connection(
                        stream,
                        peer,
                        mutator.clone(),
                        cancel.child_token(),
                    ));
                }
                Err(e) => {
                    tracing::warn!("accept failed: {e}");
                    if !accept_backoff(&cancel).await {
                        break;
                    }
                }
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("connection task failed: {e}");
                }
            }
        }
    }

    drop(listener);
    tracing::info!(open = connections.len(), "command channel closing");

    let drain = async {
        while connections.join_next().await.is_some() {}
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        tracing::warn!("connections did not close in time, aborting");
        connections.shutdown().await;
    }
    tracing::info!("command channel stopped");
}

/// Wait out [`ACCEPT_BACKOFF`]; `false` if cancelled meanwhile.
async fn accept_backoff(cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => true,
    }
}

/// Command channel running on its own runtime thread.
///
/// Dropping the handle shuts the channel down too; [`CommandChannel::shutdown`]
/// just makes the point explicit.
#[derive(Debug)]
pub struct CommandChannel {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl CommandChannel {
    /// Bind `addr` and start serving on a dedicated thread.
    ///
    /// Binding happens before this returns, so a taken port is reported here
    /// rather than lost on the background thread.
    pub fn spawn(addr: SocketAddr, mutator: ViewpointMutator) -> Result<Self, ChannelError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("vantage-channel-worker")
            .enable_all()
            .build()
            .map_err(ChannelError::Runtime)?;

        let listener = runtime
            .block_on(TcpListener::bind(addr))
            .map_err(|source| ChannelError::Bind { addr, source })?;
        let local_addr = listener.local_addr().map_err(ChannelError::LocalAddr)?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let thread = std::thread::Builder::new()
            .name("vantage-channel".into())
            .spawn(move || {
                runtime.block_on(serve(listener, mutator, token));
                runtime.shutdown_timeout(SHUTDOWN_GRACE);
            })
            .map_err(ChannelError::Runtime)?;

        tracing::info!(%local_addr, "command channel listening");
        Ok(Self {
            local_addr,
            cancel,
            thread: Some(thread),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `ws://` URL a local client can use to reach this channel.
    pub fn url(&self) -> String {
        let port = self.local_addr.port();
        if self.local_addr.ip().is_unspecified() {
            format!("ws://127.0.0.1:{port}")
        } else {
            format!("ws://{}", self.local_addr)
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop accepting, close open connections, and join the runtime thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("command channel thread panicked");
            }
        }
    }
}

impl Drop for CommandChannel {
    fn drop(&mut self) {
        self.stop();
    }
}
