//! Realtime subscription to server snapshots

use std::sync::Arc;
use std::time::Duration;

use clubhours_core::{ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::dashboard::Dashboard;
use crate::error::ClientError;
use crate::offline_queue::OperationExecutor;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Keep a realtime connection open for the life of the process.
///
/// The dashboard is marked online on connect and offline when the
/// socket drops, so queued writes replay on every reconnect and are
/// retried after each message while connected.
pub async fn run_subscription<E: OperationExecutor>(url: String, dashboard: Arc<Dashboard<E>>) {
    loop {
        match connect_once(&url, &dashboard).await {
            Ok(()) => tracing::info!("Realtime connection closed"),
            Err(e) => tracing::warn!("Realtime connection failed: {}", e),
        }
        dashboard.set_online(false).await;
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// One connection: request a snapshot, then apply server messages until
/// the socket closes
pub async fn connect_once<E: OperationExecutor>(
    url: &str,
    dashboard: &Dashboard<E>,
) -> Result<(), ClientError> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::Realtime(e.to_string()))?;
    tracing::info!("Realtime connected to {}", url);

    let (mut write, mut read) = ws.split();

    let request = encode(&ClientMessage::RequestSnapshot)?;
    write
        .send(Message::Text(request))
        .await
        .map_err(|e| ClientError::Realtime(e.to_string()))?;

    if let Some(report) = dashboard.set_online(true).await {
        if report.applied + report.dropped > 0 {
            tracing::info!(
                applied = %report.applied,
                retained = %report.retained,
                dropped = %report.dropped,
                "Replayed offline queue"
            );
        }
    }

    while let Some(frame) = read.next().await {
        let frame = frame.map_err(|e| ClientError::Realtime(e.to_string()))?;
        match frame {
            Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                Ok(msg) => dashboard.apply_server_message(msg),
                Err(e) => tracing::warn!("Ignoring malformed realtime message: {}", e),
            },
            Message::Ping(payload) => {
                write
                    .send(Message::Pong(payload))
                    .await
                    .map_err(|e| ClientError::Realtime(e.to_string()))?;
            }
            Message::Close(_) => break,
            _ => {}
        }

        // The link is up, so anything a REST blip left behind can go now
        if let Some(report) = dashboard.retry_pending().await {
            tracing::debug!(
                applied = %report.applied,
                retained = %report.retained,
                "Retried pending writes"
            );
        }
    }

    Ok(())
}

fn encode(msg: &ClientMessage) -> Result<String, ClientError> {
    serde_json::to_string(msg).map_err(|e| ClientError::Decode(e.to_string()))
}
