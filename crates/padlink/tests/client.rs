//! Integration tests for the controller connection state machine.
//!
//! Each test binds a raw `tokio-tungstenite` endpoint playing the
//! game's role, scripts its side of the handshake, and asserts on the
//! events and frames observed on both ends of a real socket.

use futures_util::{SinkExt, StreamExt};
use padlink::{
    Button, ClientError, ConnectFailureReason, ConnectionState,
    ControllerClient, ControllerEvent, MenuAction, PlayerColor,
};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as WsMessage;

type ServerWs = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Binds the game endpoint on a random port.
async fn bind_game() -> (TcpListener, String, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have addr");
    (listener, addr.ip().to_string(), addr.port())
}

/// Accepts the next controller connection.
async fn accept(listener: &TcpListener) -> ServerWs {
    let (stream, _) = listener.accept().await.expect("should accept");
    tokio_tungstenite::accept_async(stream)
        .await
        .expect("should upgrade")
}

/// Reads the next text frame from the controller and parses it as JSON.
async fn read_json(ws: &mut ServerWs) -> Value {
    let msg = ws
        .next()
        .await
        .expect("controller should send a frame")
        .expect("frame should be readable");
    serde_json::from_str(msg.into_text().expect("should be text").as_str())
        .expect("frame should be JSON")
}

/// Sends a JSON value as a text frame to the controller.
async fn send_json(ws: &mut ServerWs, value: Value) {
    ws.send(WsMessage::text(value.to_string()))
        .await
        .expect("send should succeed");
}

/// Connects and scripts the handshake up to `NameOk`, returning the
/// accepted endpoint with the client ready.
async fn connect_ready(
    listener: &TcpListener,
    host: &str,
    port: u16,
    client: &ControllerClient,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<ControllerEvent>,
) -> ServerWs {
    client.connect("Alice", host, port);
    let mut ws = accept(listener).await;

    let hello = read_json(&mut ws).await;
    assert_eq!(hello["type"], "Name");

    send_json(&mut ws, json!({"type": "NameOk"})).await;
    assert_eq!(events.recv().await, Some(ControllerEvent::Ready));
    ws
}

#[tokio::test]
async fn test_connect_announces_name_and_becomes_ready() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();

    client.connect("Alice", &host, port);
    assert_eq!(client.state(), ConnectionState::Connecting);

    let mut ws = accept(&listener).await;
    let hello = read_json(&mut ws).await;
    assert_eq!(hello["type"], "Name");
    assert_eq!(hello["name"], "Alice");

    assert!(!client.is_ready(), "not ready before acceptance");

    send_json(&mut ws, json!({"type": "NameOk"})).await;

    assert_eq!(events.recv().await, Some(ControllerEvent::Ready));
    assert!(client.is_ready());
    assert_eq!(client.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_duplicate_name_ok_emits_ready_once() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();

    client.connect("Alice", &host, port);
    let mut ws = accept(&listener).await;
    read_json(&mut ws).await;

    send_json(&mut ws, json!({"type": "NameOk"})).await;
    send_json(&mut ws, json!({"type": "NameOk"})).await;
    send_json(&mut ws, json!({"type": "PlayerColor", "color": "Red"})).await;

    assert_eq!(events.recv().await, Some(ControllerEvent::Ready));
    // The next event must be the color change, not a second Ready.
    assert_eq!(
        events.recv().await,
        Some(ControllerEvent::PlayerColorChanged(PlayerColor::Red))
    );
}

#[tokio::test]
async fn test_name_taken_rejection() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();

    client.connect("Alice", &host, port);
    let mut ws = accept(&listener).await;
    read_json(&mut ws).await;

    send_json(&mut ws, json!({"type": "NameTaken", "name": "Alice"})).await;

    assert_eq!(
        events.recv().await,
        Some(ControllerEvent::ConnectFailure(
            ConnectFailureReason::NameAlreadyTaken
        ))
    );
    assert_eq!(client.state(), ConnectionState::NotConnected);

    // The controller closes the socket itself after a rejection.
    loop {
        match ws.next().await {
            Some(Ok(WsMessage::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(_)) => break,
        }
    }
}

#[tokio::test]
async fn test_max_players_rejection() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();

    client.connect("Alice", &host, port);
    let mut ws = accept(&listener).await;
    read_json(&mut ws).await;

    send_json(&mut ws, json!({"type": "MaxPlayersReached"})).await;

    assert_eq!(
        events.recv().await,
        Some(ControllerEvent::ConnectFailure(
            ConnectFailureReason::MaxPlayersReached
        ))
    );
    assert!(!client.is_ready());
}

#[tokio::test]
async fn test_rejection_emits_no_disconnected_event() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();

    client.connect("Alice", &host, port);
    let mut ws = accept(&listener).await;
    read_json(&mut ws).await;

    send_json(&mut ws, json!({"type": "NameTaken", "name": "Alice"})).await;

    assert_eq!(
        events.recv().await,
        Some(ControllerEvent::ConnectFailure(
            ConnectFailureReason::NameAlreadyTaken
        ))
    );

    // Once the client is gone and its tasks have wound down, the
    // channel must end without a trailing Disconnected.
    drop(client);
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn test_server_close_emits_single_disconnected() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    ws.send(WsMessage::Close(None)).await.unwrap();

    assert_eq!(events.recv().await, Some(ControllerEvent::Disconnected));
    assert!(!client.is_ready());
    assert_eq!(client.state(), ConnectionState::NotConnected);

    let result = client.set_button(Button::Attack, true);
    assert!(matches!(result, Err(ClientError::NotReady)));

    drop(client);
    assert_eq!(events.recv().await, None, "exactly one Disconnected");
}

#[tokio::test]
async fn test_undecodable_frame_tears_down_connection() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    ws.send(WsMessage::text("definitely not json")).await.unwrap();

    assert_eq!(events.recv().await, Some(ControllerEvent::Error));
    assert_eq!(events.recv().await, Some(ControllerEvent::Disconnected));
    assert!(!client.is_ready());
}

#[tokio::test]
async fn test_connect_failure_when_no_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, mut events) = ControllerClient::new();
    client.connect("Alice", &addr.ip().to_string(), addr.port());

    assert_eq!(events.recv().await, Some(ControllerEvent::Error));
    assert_eq!(events.recv().await, Some(ControllerEvent::Disconnected));
    assert_eq!(client.state(), ConnectionState::NotConnected);
}

#[tokio::test]
async fn test_player_color_assignment() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    assert!(client.color().is_none());

    send_json(&mut ws, json!({"type": "PlayerColor", "color": "Green"})).await;

    assert_eq!(
        events.recv().await,
        Some(ControllerEvent::PlayerColorChanged(PlayerColor::Green))
    );
    assert_eq!(client.color(), Some(PlayerColor::Green));

    // Reassignment overwrites.
    send_json(&mut ws, json!({"type": "PlayerColor", "color": "Any"})).await;
    assert_eq!(
        events.recv().await,
        Some(ControllerEvent::PlayerColorChanged(PlayerColor::Any))
    );
    assert_eq!(client.color(), Some(PlayerColor::Any));
}

#[tokio::test]
async fn test_menu_action_deltas_update_cached_set() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    send_json(
        &mut ws,
        json!({"type": "SetMenuAction", "action": "StartGame", "enabled": true}),
    )
    .await;
    let Some(ControllerEvent::MenuActionsChanged(set)) = events.recv().await
    else {
        panic!("expected MenuActionsChanged");
    };
    assert_eq!(set, [MenuAction::StartGame].into_iter().collect());

    send_json(
        &mut ws,
        json!({"type": "SetMenuAction", "action": "ShowMap", "enabled": true}),
    )
    .await;
    let Some(ControllerEvent::MenuActionsChanged(set)) = events.recv().await
    else {
        panic!("expected MenuActionsChanged");
    };
    assert_eq!(
        set,
        [MenuAction::StartGame, MenuAction::ShowMap]
            .into_iter()
            .collect()
    );

    send_json(
        &mut ws,
        json!({"type": "SetMenuAction", "action": "StartGame", "enabled": false}),
    )
    .await;
    let Some(ControllerEvent::MenuActionsChanged(set)) = events.recv().await
    else {
        panic!("expected MenuActionsChanged");
    };
    assert_eq!(set, [MenuAction::ShowMap].into_iter().collect());

    assert_eq!(
        client.enabled_menu_actions(),
        [MenuAction::ShowMap].into_iter().collect()
    );
}

#[tokio::test]
async fn test_trigger_menu_action_checks_enabled_set() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    // Not enabled yet: rejected locally, nothing on the wire.
    let result = client.trigger_menu_action(MenuAction::StartGame);
    assert!(matches!(
        result,
        Err(ClientError::MenuActionNotEnabled(MenuAction::StartGame))
    ));

    send_json(
        &mut ws,
        json!({"type": "SetMenuAction", "action": "StartGame", "enabled": true}),
    )
    .await;
    assert!(matches!(
        events.recv().await,
        Some(ControllerEvent::MenuActionsChanged(_))
    ));

    client
        .trigger_menu_action(MenuAction::StartGame)
        .expect("enabled action should send");

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "MenuActionTriggered");
    assert_eq!(frame["action"], "StartGame");
}

#[tokio::test]
async fn test_button_edges_deduplicated() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    client.set_button(Button::Attack, true).unwrap();
    // Repeating the current state must not produce a frame.
    client.set_button(Button::Attack, true).unwrap();
    client.set_button(Button::Attack, false).unwrap();

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "Button");
    assert_eq!(frame["button"], "Attack");
    assert_eq!(frame["pressed"], true);

    // Next frame is the release, proving the duplicate was dropped.
    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "Button");
    assert_eq!(frame["pressed"], false);
}

#[tokio::test]
async fn test_joystick_changes_deduplicated() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    // Matches the initial neutral cache, so no frame.
    client.set_joystick_position(0.0, 0.0).unwrap();
    client.set_joystick_position(0.5, -0.5).unwrap();
    // Unchanged, no frame.
    client.set_joystick_position(0.5, -0.5).unwrap();
    client.set_button(Button::Pull, true).unwrap();

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "Joystick");
    assert_eq!(frame["vertical"], 0.5);
    assert_eq!(frame["horizontal"], -0.5);

    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "Button", "duplicate joystick was dropped");
}

#[tokio::test]
async fn test_joystick_out_of_range_sends_nothing() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    let result = client.set_joystick_position(1.5, 0.0);
    assert!(matches!(
        result,
        Err(ClientError::JoystickOutOfRange { .. })
    ));

    client.set_button(Button::Carry, true).unwrap();
    let frame = read_json(&mut ws).await;
    assert_eq!(frame["type"], "Button", "no joystick frame was sent");
}

#[tokio::test]
async fn test_reconnect_supersedes_previous_transport() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();

    client.connect("Alice", &host, port);
    let mut ws1 = accept(&listener).await;
    read_json(&mut ws1).await;

    // Second connect before the first handshake completes.
    client.connect("Alice", &host, port);
    let mut ws2 = accept(&listener).await;
    let hello = read_json(&mut ws2).await;
    assert_eq!(hello["type"], "Name");

    // The first transport gets closed out from under the game.
    loop {
        match ws1.next().await {
            Some(Ok(WsMessage::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(_)) => break,
        }
    }

    send_json(&mut ws2, json!({"type": "NameOk"})).await;

    // The superseded connection contributed no events.
    assert_eq!(events.recv().await, Some(ControllerEvent::Ready));
    assert!(client.is_ready());
}

#[tokio::test]
async fn test_reconnect_resets_cached_state() {
    let (listener, host, port) = bind_game().await;
    let (client, mut events) = ControllerClient::new();
    let mut ws =
        connect_ready(&listener, &host, port, &client, &mut events).await;

    send_json(&mut ws, json!({"type": "PlayerColor", "color": "Blue"})).await;
    send_json(
        &mut ws,
        json!({"type": "SetMenuAction", "action": "PauseGame", "enabled": true}),
    )
    .await;
    events.recv().await;
    events.recv().await;
    assert_eq!(client.color(), Some(PlayerColor::Blue));

    // Reconnect wipes color and menu actions from the old session.
    client.connect("Alice", &host, port);
    assert_eq!(client.color(), None);
    assert!(client.enabled_menu_actions().is_empty());
    assert_eq!(client.state(), ConnectionState::Connecting);
}
