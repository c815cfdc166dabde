use crate::producer::{generate_tick, session_rng};
use crate::state::AppState;
use axum::{
    extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use devicemon_shared::DeviceId;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Public router constructor
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // ws://host:8080 and ws://host:8080/ws both stream readings
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/api/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// DTO returned by /api/status
#[derive(Debug, Serialize)]
pub struct StatusMsg {
    pub devices: Vec<DeviceId>,
    pub tick_ms: u64,
    pub connected_clients: usize,
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusMsg> {
    Json(StatusMsg {
        devices: state.config.devices.clone(),
        tick_ms: state.config.tick_ms,
        connected_clients: state.connected_clients(),
    })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Subscribe before the upgrade completes so a shutdown fired in between
    // is not missed.
    let shutdown_rx = state.shutdown_tx.subscribe();
    ws.on_upgrade(move |socket| handle_ws(socket, state, shutdown_rx))
}

async fn send_tick(
    sender: &mut SplitSink<WebSocket, Message>,
    rng: &mut StdRng,
    devices: &[DeviceId],
) -> Result<(), axum::Error> {
    // One frame per reading, never batched.
    for text in generate_tick(rng, devices) {
        sender.send(Message::Text(Utf8Bytes::from(text))).await?;
    }
    Ok(())
}

async fn handle_ws(
    socket: WebSocket,
    state: Arc<AppState>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    // Dropped on every exit path below, which unregisters the client.
    let session = state.open_session();
    let id = session.id();
    info!(session = id, "client connected");

    let (mut sender, mut receiver) = socket.split();

    if state.is_shutting_down() {
        let _ = sender.send(Message::Close(None)).await;
        info!(session = id, reason = "server shutting down", "client disconnected");
        return;
    }

    // Each client gets its own timer and generator.
    let mut rng = session_rng(state.config.seed);
    let period = state.config.tick_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let reason = loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = send_tick(&mut sender, &mut rng, &state.config.devices).await {
                    debug!(session = id, "send failed: {e}");
                    break "send failed";
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break "closed by client",
                    Some(Err(e)) => {
                        debug!(session = id, "read failed: {e}");
                        break "read failed";
                    }
                    // The stream is one-way; anything the client sends is ignored.
                    Some(Ok(_)) => {}
                }
            }

            _ = shutdown_rx.recv() => {
                let _ = sender.send(Message::Close(None)).await;
                break "server shutting down";
            }
        }
    };

    info!(session = id, reason, "client disconnected");
}
