//! End-to-end tests over a real WebSocket connection.
//!
//! Each test binds the accept loop to an ephemeral localhost port, connects
//! real `tokio-tungstenite` clients, and observes the effects through the
//! [`MockGamepadDriver`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use webpad_core::{Button, Slot};
use webpad_server::application::{GamepadDriver, SessionManager};
use webpad_server::infrastructure::gamepad::mock::MockGamepadDriver;
use webpad_server::infrastructure::serve;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Harness {
    addr: SocketAddr,
    driver: Arc<MockGamepadDriver>,
    manager: Arc<SessionManager>,
    running: Arc<AtomicBool>,
}

impl Harness {
    async fn start() -> Self {
        let driver = Arc::new(MockGamepadDriver::new());
        let manager = Arc::new(SessionManager::new(
            Arc::clone(&driver) as Arc<dyn GamepadDriver>,
            4,
        ));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        tokio::spawn(serve(listener, Arc::clone(&manager), Arc::clone(&running)));
        Self {
            addr,
            driver,
            manager,
            running,
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _response) = connect_async(format!("ws://{}", self.addr)).await.unwrap();
        ws
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Reads the next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut Client) -> Option<Value> {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")?;
        match frame {
            Ok(WsMessage::Text(text)) => return Some(serde_json::from_str(&text).unwrap()),
            Ok(WsMessage::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// Polls `cond` until it holds or two seconds pass.
async fn eventually(cond: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

#[tokio::test]
async fn test_players_are_numbered_and_fifth_is_rejected() {
    // Arrange
    let harness = Harness::start().await;
    let mut clients = Vec::new();

    // Act: four players join in turn
    for expected in 1..=4 {
        let mut ws = harness.connect().await;
        let msg = next_json(&mut ws).await.unwrap();
        assert_eq!(msg, json!({"event": "player_id", "data": expected}));
        clients.push(ws);
    }

    // Act: a fifth browser connects
    let mut fifth = harness.connect().await;
    let msg = next_json(&mut fifth).await.unwrap();

    // Assert: error reply, then the server closes the socket
    assert_eq!(msg, json!({"event": "error", "data": "Server full – max 4 players"}));
    assert!(next_json(&mut fifth).await.is_none());
    assert_eq!(harness.manager.active_count(), 4);
}

#[tokio::test]
async fn test_input_frames_drive_the_gamepad() {
    // Arrange
    let harness = Harness::start().await;
    let mut ws = harness.connect().await;
    next_json(&mut ws).await.unwrap();

    // Act: one garbage frame, then real input
    ws.send(WsMessage::Text("not json".to_string())).await.unwrap();
    let input = json!({"event": "input", "data": {"buttons": {"a": true}, "rt": 0.75}});
    ws.send(WsMessage::Text(input.to_string())).await.unwrap();

    // Assert
    let driver = Arc::clone(&harness.driver);
    assert!(
        eventually(|| driver
            .device(Slot::new(1).unwrap())
            .is_some_and(|d| d.report().is_pressed(Button::A)))
        .await
    );
    let report = driver.device(Slot::new(1).unwrap()).unwrap().report();
    assert_eq!(report.right_trigger, 0.75);
    assert_eq!(harness.manager.active_count(), 1, "bad frame must not end the session");
}

#[tokio::test]
async fn test_closing_browser_frees_slot_for_next_player() {
    // Arrange: players 1 and 2
    let harness = Harness::start().await;
    let mut first = harness.connect().await;
    next_json(&mut first).await.unwrap();
    let mut second = harness.connect().await;
    next_json(&mut second).await.unwrap();

    // Act: player 1 leaves
    first.close(None).await.unwrap();
    let manager = Arc::clone(&harness.manager);
    assert!(eventually(|| manager.active_count() == 1).await);

    // Assert: the device was neutralised and the next browser is player 1
    let device = harness.driver.device(Slot::new(1).unwrap()).unwrap();
    assert!(device.reset_before_destroy());

    let mut third = harness.connect().await;
    let msg = next_json(&mut third).await.unwrap();
    assert_eq!(msg, json!({"event": "player_id", "data": 1}));
}

#[tokio::test]
async fn test_driver_rejection_is_reported_then_socket_closed() {
    // Arrange: no device can be created
    let harness = Harness::start().await;
    harness.driver.set_available(false);

    // Act
    let mut ws = harness.connect().await;
    let msg = next_json(&mut ws).await.unwrap();

    // Assert: error reply, then a clean close, and no session left behind
    assert_eq!(
        msg,
        json!({"event": "error", "data": "Virtual gamepad driver unavailable on the host"})
    );
    assert!(next_json(&mut ws).await.is_none());
    assert_eq!(harness.manager.active_count(), 0);
}
