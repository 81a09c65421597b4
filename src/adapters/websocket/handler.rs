//! WebSocket upgrade handler for broadcaster and listener connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Register with the coordinator (which greets the client)
//! 3. Pump coordinator output to the socket and socket input to the coordinator
//! 4. Ping on a fixed interval and drop peers that stop answering
//! 5. Disconnect from the coordinator when either side ends

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::application::{SessionCoordinator, SessionError};
use crate::domain::foundation::ConnectionId;
use crate::domain::protocol::ClientMessage;
use crate::ports::Outbound;

use super::heartbeat::{Beat, HeartbeatMonitor, HeartbeatSettings, Liveness};
use super::sink::ChannelSink;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub coordinator: Arc<SessionCoordinator>,
    /// Per-connection outbound queue capacity.
    pub outbound_buffer: usize,
    pub heartbeat: HeartbeatSettings,
}

impl WebSocketState {
    pub fn new(
        coordinator: Arc<SessionCoordinator>,
        outbound_buffer: usize,
        heartbeat: HeartbeatSettings,
    ) -> Self {
        Self {
            coordinator,
            outbound_buffer,
            heartbeat,
        }
    }
}

/// Why a connection's writer stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterExit {
    /// The coordinator dropped the sink.
    Drained,
    /// The socket refused a frame.
    SendFailed,
    /// The peer stopped answering pings.
    TimedOut,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection. The coordinator only ever sees
/// the channel sink, so it never awaits on this socket.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (sender, mut receiver) = socket.split();

    let (sink, outbound_rx) = ChannelSink::channel(state.outbound_buffer);
    let client_id = state.coordinator.connect(Arc::new(sink)).await;
    let liveness = Arc::new(Liveness::new());

    let mut send_task = tokio::spawn(write_loop(
        sender,
        outbound_rx,
        liveness.clone(),
        state.heartbeat,
        client_id,
    ));

    let coordinator = state.coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            if result.is_ok() {
                liveness.mark_alive();
            }
            match result {
                Ok(Message::Text(text)) => {
                    dispatch_text(&coordinator, client_id, &text).await;
                }
                Ok(Message::Binary(data)) => {
                    dispatch_binary(&coordinator, client_id, data).await;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // axum answers pings itself; both only count as activity
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(client_id = %client_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(client_id = %client_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    state.coordinator.disconnect(client_id).await;
}

/// Drain the outbound queue into the socket and ping on every heartbeat tick.
///
/// Returns once the queue closes, a write fails, or the peer goes silent for
/// longer than the heartbeat timeout.
async fn write_loop<S>(
    mut sender: S,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    liveness: Arc<Liveness>,
    heartbeat: HeartbeatSettings,
    client_id: ConnectionId,
) -> WriterExit
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut monitor = HeartbeatMonitor::new(liveness, &heartbeat);
    let mut ping_interval = time::interval(heartbeat.interval);
    ping_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the immediate first tick
    ping_interval.tick().await;

    let exit = loop {
        let frame = tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(outbound) = outbound else { break WriterExit::Drained };
                match encode(outbound) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(client_id = %client_id, "Failed to encode frame: {}", e);
                        continue;
                    }
                }
            }
            _ = ping_interval.tick() => match monitor.tick() {
                Beat::Ping => Message::Ping(Vec::new()),
                Beat::TimedOut => {
                    tracing::info!(
                        client_id = %client_id,
                        timeout_secs = heartbeat.timeout.as_secs(),
                        "Client unresponsive, disconnecting"
                    );
                    break WriterExit::TimedOut;
                }
            },
        };

        if let Err(e) = sender.send(frame).await {
            tracing::debug!(
                client_id = %client_id,
                "Send error, closing connection: {}",
                e
            );
            break WriterExit::SendFailed;
        }
    };

    if let Err(e) = sender.close().await {
        tracing::trace!(client_id = %client_id, "Close error: {}", e);
    }
    exit
}

/// Decode a text frame into a client message, tagging failures as malformed.
fn decode_frame(text: &str) -> Result<ClientMessage, SessionError> {
    Ok(ClientMessage::decode(text)?)
}

async fn dispatch_text(coordinator: &SessionCoordinator, client_id: ConnectionId, text: &str) {
    let message = match decode_frame(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(
                client_id = %client_id,
                code = %e.code(),
                "Dropping frame: {}",
                e
            );
            return;
        }
    };

    let kind = message.kind();
    tracing::trace!(client_id = %client_id, kind, "Received message");

    if let Err(e) = coordinator.handle(client_id, message).await {
        tracing::debug!(
            client_id = %client_id,
            kind,
            code = %e.code(),
            reported = e.is_reported(),
            "Message not applied: {}",
            e
        );
    }
}

async fn dispatch_binary(coordinator: &SessionCoordinator, client_id: ConnectionId, data: Vec<u8>) {
    if let Err(e) = coordinator.relay_audio(client_id, Arc::from(data)).await {
        tracing::debug!(client_id = %client_id, code = %e.code(), "Binary frame dropped: {}", e);
    }
}

fn encode(outbound: Outbound) -> Result<Message, serde_json::Error> {
    match outbound {
        Outbound::Message(msg) => msg.to_json().map(Message::Text),
        Outbound::Audio(frame) => Ok(Message::Binary(frame.to_vec())),
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
