//! Integration tests for the real-time channel.
//!
//! Each test serves the full router on an ephemeral `127.0.0.1` port,
//! backed by the in-memory store, and connects real `WebSocket` clients.
//! Writes go through the same shared state via `tower::ServiceExt`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use places_api::{AllowedOrigin, AppState, build_router, serve};
use places_db::MemoryPlaceStore;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

const ALLOWED_ORIGIN: &str = "http://localhost:8000";

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =========================================================================
// Helpers
// =========================================================================

async fn start() -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::new(
        Arc::new(MemoryPlaceStore::new()),
        AllowedOrigin::parse(ALLOWED_ORIGIN),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(
        listener,
        Arc::clone(&state),
        std::future::pending::<()>(),
    ));
    (state, addr)
}

fn upgrade_request(addr: SocketAddr, origin: &str) -> tungstenite::handshake::client::Request {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("origin", origin.parse().unwrap());
    request
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(upgrade_request(addr, ALLOWED_ORIGIN))
        .await
        .expect("upgrade from the allowed origin");
    client
}

async fn wait_for_subscribers(state: &AppState, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.notifier.subscriber_count().await != count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never reached");
}

/// Next raw frame from the server.
async fn next_message(client: &mut Client) -> Message {
    tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("connection ended")
        .unwrap()
}

/// Next text frame, parsed as JSON.
async fn next_event(client: &mut Client) -> Value {
    loop {
        if let Message::Text(text) = next_message(client).await {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn post_place(state: &Arc<AppState>, name: &str) -> Value {
    let body = json!({"name": name, "category": "museum", "lat": 48.86, "lng": 2.34});
    let response = build_router(Arc::clone(state))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/places")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn created_place_is_pushed_as_place_added() {
    let (state, addr) = start().await;
    let mut client = connect(addr).await;
    wait_for_subscribers(&state, 1).await;

    let created = post_place(&state, "Louvre").await;

    let frame = next_event(&mut client).await;
    assert_eq!(frame["event"], "place-added");
    assert_eq!(frame["data"], created);
    assert_eq!(frame["data"]["visitCount"], 0);
}

#[tokio::test]
async fn user_action_reaches_others_but_not_sender() {
    let (state, addr) = start().await;
    let mut sender = connect(addr).await;
    let mut other = connect(addr).await;
    wait_for_subscribers(&state, 2).await;

    let action = json!({"event": "user-action", "data": {"cursor": [3, 4]}});
    sender
        .send(Message::text(action.to_string()))
        .await
        .unwrap();
    assert_eq!(next_event(&mut other).await, action);

    // The sender's next frame is the following server event, not its own relay.
    post_place(&state, "Orsay").await;
    assert_eq!(next_event(&mut sender).await["event"], "place-added");
    assert_eq!(next_event(&mut other).await["event"], "place-added");
}

#[tokio::test]
async fn unrecognised_client_frames_are_not_relayed() {
    let (state, addr) = start().await;
    let mut sender = connect(addr).await;
    let mut other = connect(addr).await;
    wait_for_subscribers(&state, 2).await;

    sender.send(Message::text("not json")).await.unwrap();
    sender
        .send(Message::text(
            json!({"event": "place-deleted", "data": "forged"}).to_string(),
        ))
        .await
        .unwrap();

    // Frames from one client are handled in order, so the first thing the
    // other client sees must be this marker.
    let marker = json!({"event": "user-action", "data": "after"});
    sender
        .send(Message::text(marker.to_string()))
        .await
        .unwrap();
    assert_eq!(next_event(&mut other).await, marker);
    assert_eq!(state.notifier.subscriber_count().await, 2);
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let (state, addr) = start().await;
    let mut client = connect(addr).await;
    wait_for_subscribers(&state, 1).await;

    client
        .send(Message::Ping(vec![7, 7].into()))
        .await
        .unwrap();
    assert!(matches!(next_message(&mut client).await, Message::Pong(_)));
}

#[tokio::test]
async fn disallowed_origin_upgrade_is_forbidden() {
    let (state, addr) = start().await;

    let result = connect_async(upgrade_request(addr, "http://evil.example")).await;
    assert!(matches!(
        result,
        Err(tungstenite::Error::Http(ref response)) if response.status().as_u16() == 403
    ));
    assert_eq!(state.notifier.subscriber_count().await, 0);
}

#[tokio::test]
async fn closing_the_socket_unregisters_the_subscriber() {
    let (state, addr) = start().await;
    let mut client = connect(addr).await;
    wait_for_subscribers(&state, 1).await;

    client.close(None).await.unwrap();
    wait_for_subscribers(&state, 0).await;
}
