use crate::error::ChannelError;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Connect to a command channel, send each payload as one text message, then
/// close cleanly. Returns the number of payloads sent.
pub async fn send_payloads<S: AsRef<str>>(url: &str, payloads: &[S]) -> Result<usize, ChannelError> {
    let (mut ws, _response) = connect_async(url).await?;
    tracing::debug!(url, "connected to command channel");

    for payload in payloads {
        ws.send(Message::Text(payload.as_ref().to_owned())).await?;
    }

    ws.close(None).await?;
    // Wait for the server's close reply so nothing is cut off mid-flight.
    while let Some(msg) = ws.next().await {
        if msg.is_err() {
            break;
        }
    }
    Ok(payloads.len())
}
