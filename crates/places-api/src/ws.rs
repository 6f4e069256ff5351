//! `WebSocket` handler for the real-time channel.
//!
//! Clients connect to `GET /ws` and receive a JSON frame
//! (`{"event": ..., "data": ...}`) for every place change. A client may
//! send `{"event": "user-action", "data": ...}`, which is relayed to
//! every other connected client.
//!
//! If a client falls behind, lagged messages are silently skipped and
//! the client resumes from the oldest retained message.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::{IntoResponse, Response};
use places_types::ClientMessage;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::notifier::Subscription;
use crate::state::AppState;

/// The browser origin permitted to open the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    /// Any origin (`*`).
    Any,
    /// Exactly this origin, e.g. `http://localhost:8000`.
    Exact(String),
}

impl AllowedOrigin {
    /// Parse a configured origin. `*` means any.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "*" => Self::Any,
            other => Self::Exact(other.trim_end_matches('/').to_owned()),
        }
    }

    /// Whether a request carrying this `Origin` header may connect.
    ///
    /// Requests without an `Origin` header come from non-browser clients
    /// and are always let through.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (Self::Any, _) | (_, None) => true,
            (Self::Exact(allowed), Some(origin)) => allowed == origin,
        }
    }
}

/// Upgrade an HTTP request to a `WebSocket` connection and join the
/// real-time channel.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_channel(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.allowed_origin.permits(origin) {
        let origin = origin.unwrap_or_default().to_owned();
        warn!(%origin, "Rejected real-time connection from disallowed origin");
        return Err(ApiError::OriginNotAllowed(origin));
    }

    Ok(ws
        .on_upgrade(move |socket| handle_ws(socket, state))
        .into_response())
}

/// Handle the `WebSocket` lifecycle: register, pump messages both ways,
/// then deregister.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let subscription = state.notifier.subscribe().await;
    let id = subscription.id();
    info!(subscriber = %id, "Subscriber connected");

    run_session(socket, subscription, &state).await;

    state.notifier.unsubscribe(id).await;
    info!(subscriber = %id, "Subscriber disconnected");
}

async fn run_session(mut socket: WebSocket, mut subscription: Subscription, state: &AppState) {
    let id = subscription.id();

    loop {
        tokio::select! {
            // Forward a channel message to this client.
            result = subscription.recv() => {
                match result {
                    Ok(envelope) => {
                        let json = match serde_json::to_string(&envelope.event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize channel event: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!(subscriber = %id, "Send failed");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(subscriber = %id, skipped = n, "Subscriber lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Handle a frame from this client.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(msg) => {
                                state.notifier.relay(id, msg.into());
                            }
                            Err(e) => {
                                debug!(subscriber = %id, "Ignoring unrecognised client frame: {e}");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %id, "Pong failed");
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Err(e)) => {
                        debug!(subscriber = %id, "WebSocket error: {e}");
                        return;
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }
}
