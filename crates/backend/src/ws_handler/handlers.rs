//! WebSocket message handlers

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use clubhours_core::{ClientMessage, ServerMessage};
use crate::AppState;

pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the first snapshot so no write slips between the two
    let mut events = state.events.subscribe();

    let initial = snapshot_message(&state).await;
    if send_message(&mut sender, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                        continue;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };

                let response = handle_client_message(text.as_str(), &state).await;
                if send_message(&mut sender, &response).await.is_err() {
                    break;
                }
            }
            event = events.recv() => {
                let message = match event {
                    Ok(message) => message,
                    Err(RecvError::Lagged(skipped)) => {
                        // Snapshots supersede each other, so jump to the present
                        tracing::warn!("Realtime subscriber lagged by {} messages", skipped);
                        events = events.resubscribe();
                        snapshot_message(&state).await
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_message(&mut sender, &message).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Realtime subscriber disconnected");
}

async fn handle_client_message(text: &str, state: &Arc<AppState>) -> ServerMessage {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Ping) => ServerMessage::Pong,
        Ok(ClientMessage::RequestSnapshot) => snapshot_message(state).await,
        Err(e) => ServerMessage::Error {
            message: format!("Invalid message: {}", e),
        },
    }
}

async fn snapshot_message(state: &Arc<AppState>) -> ServerMessage {
    match crate::db::load_snapshot(&state.db_pool, state.club_offset).await {
        Ok(snapshot) => ServerMessage::Snapshot { snapshot },
        Err(e) => {
            tracing::error!("Failed to load snapshot for subscriber: {}", e);
            ServerMessage::Error { message: "Failed to load club data".to_string() }
        }
    }
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Failed to encode realtime message: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
