//! WebSocket connection lifecycle management.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::hub::Push;
use super::protocol::ClientMessage;
use crate::config::KeepAlive;
use crate::game::GameError;
use crate::http::routes::AppState;
use crate::room::{Room, RoomError};

// how long a closing writer gets to flush what is already queued
const WRITER_DRAIN: Duration = Duration::from_secs(2);

pub async fn ws_handler(
    State(state): State<AppState>,
    Path((game_id, player_name)): Path<(String, String)>,
    ws: WebSocketUpgrade,
) -> Result<Response, RoomError> {
    let room = state.rooms.get(&game_id)?;
    let name = player_name.trim().to_string();
    if !room.has_player(&name) {
        return Err(GameError::UnknownPlayer(name).into());
    }
    let keepalive = state.config.keepalive;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, room, name, keepalive)))
}

async fn handle_socket(socket: WebSocket, room: Arc<Room>, name: String, keepalive: KeepAlive) {
    let (ws_tx, ws_rx) = socket.split();
    run_connection(room, name, keepalive, ws_tx, ws_rx).await;
}

/// Serve one subscriber until the peer leaves, goes quiet past
/// `keepalive.timeout`, or is replaced by a newer connection.
async fn run_connection<W, R, E>(room: Arc<Room>, name: String, keepalive: KeepAlive, mut ws_tx: W, mut ws_rx: R)
where
    W: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Push>();

    let subscription = match room.connect(&name, tx.clone()) {
        Ok(sub) => sub,
        Err(err) => {
            debug!(room_id = %room.id(), player = %name, %err, "connect refused");
            let _ = ws_tx.send(Message::Close(None)).await;
            return;
        }
    };
    let conn_id = subscription.conn_id;

    // Renders each push for this player and writes it out, off the room lock.
    let recipient = name.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(push) = rx.recv().await {
            let text = match serde_json::to_string(&push.render(&recipient)) {
                Ok(text) => text,
                Err(err) => {
                    warn!(player = %recipient, %err, "failed to encode push");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let mut ticker = interval_at(Instant::now() + keepalive.interval, keepalive.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();
    let mut writer_done = false;

    loop {
        tokio::select! {
            _ = subscription.cancel.cancelled() => {
                debug!(room_id = %room.id(), player = %name, %conn_id, "connection closed by server");
                break;
            }
            _ = &mut writer => {
                writer_done = true;
                break;
            }
            _ = ticker.tick() => {
                if last_seen.elapsed() >= keepalive.timeout {
                    debug!(room_id = %room.id(), player = %name, %conn_id, "keep-alive timeout");
                    break;
                }
                if tx.send(Push::Ping).is_err() {
                    break;
                }
            }
            frame = ws_rx.next() => match frame {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(Message::Text(text))) => {
                    last_seen = Instant::now();
                    if ClientMessage::parse(&text).is_none() {
                        debug!(player = %name, "ignoring unexpected client message");
                    }
                }
                Some(Ok(_)) => last_seen = Instant::now(),
            },
        }
    }

    room.disconnect(&name, conn_id);
    // with the hub's sender gone as well, the writer drains and closes
    drop(tx);
    if !writer_done && timeout(WRITER_DRAIN, &mut writer).await.is_err() {
        writer.abort();
    }
}
