//! The controller connection state machine.
//!
//! [`ControllerClient`] owns one logical connection to the game. Each
//! `connect` call supersedes the previous transport and spawns a
//! connection task that opens the socket, announces the player name,
//! and then runs the read loop. All inbound protocol work happens on
//! that task; the façade only performs synchronous validation and
//! fire-and-forget sends.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use padlink_protocol::{
    Button, Codec, JsonCodec, MenuAction, Message, MessageHandler,
    PlayerColor,
};
use padlink_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::event::{ConnectFailureReason, ConnectionState, ControllerEvent};

/// Default port the game listens on for controller connections.
pub const DEFAULT_PORT: u16 = 4242;

/// How a connection task ended.
enum Outcome {
    /// The transport closed.
    Closed,

    /// The transport (or an inbound frame) faulted.
    Faulted,

    /// The game rejected the identity; the close was client-initiated.
    Rejected(ConnectFailureReason),
}

/// Client side of the controller protocol.
///
/// Create one per controller with [`ControllerClient::new`], subscribe
/// to the returned event channel, then call
/// [`connect`](Self::connect). Input methods become usable once the
/// [`Ready`](ControllerEvent::Ready) event fires.
///
/// ```rust,no_run
/// # async fn run() {
/// use padlink::{ControllerClient, ControllerEvent, DEFAULT_PORT};
/// use padlink_protocol::Button;
///
/// let (client, mut events) = ControllerClient::new();
/// client.connect("Alice", "192.168.0.17", DEFAULT_PORT);
///
/// while let Some(event) = events.recv().await {
///     match event {
///         ControllerEvent::Ready => {
///             client.set_button(Button::Attack, true).unwrap();
///         }
///         ControllerEvent::Disconnected => break,
///         _ => {}
///     }
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct ControllerClient {
    inner: Arc<Inner>,
}

struct Inner {
    shared: Mutex<Shared>,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

/// State shared between the façade and the connection task.
///
/// Mutated only under the lock, and the connection task is the sole
/// writer of server-pushed fields, so readers always observe a fully
/// updated snapshot.
struct Shared {
    /// Bumped on every `connect`; tasks from older epochs exit silently.
    epoch: u64,
    state: ConnectionState,
    color: Option<PlayerColor>,
    enabled_menu_actions: HashSet<MenuAction>,
    /// Last values actually sent, so inputs go out only on a change.
    pressed_buttons: HashSet<Button>,
    joystick: (f64, f64),
    /// Frames queued for the current transport's writer task.
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl ControllerClient {
    /// Creates a client and the event channel it reports on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let client = Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    epoch: 0,
                    state: ConnectionState::NotConnected,
                    color: None,
                    enabled_menu_actions: HashSet::new(),
                    pressed_buttons: HashSet::new(),
                    joystick: (0.0, 0.0),
                    outbound: None,
                }),
                events: events_tx,
            }),
        };
        (client, events_rx)
    }

    /// Connects to the game under the given player name.
    ///
    /// Returns immediately; progress is observed via
    /// [`ControllerEvent`]s. If a previous transport is still live it
    /// is closed first — its pending events are suppressed, so
    /// `Disconnected` always refers to the connection opened by the
    /// most recent `connect`.
    ///
    /// Must be called within a Tokio runtime.
    pub fn connect(&self, name: &str, address: &str, port: u16) {
        let url = format!("ws://{address}:{port}/sockets/");
        tracing::info!(name, url, "connecting to game");

        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let epoch = {
            let mut shared = self.inner.shared.lock().unwrap();
            shared.epoch += 1;
            shared.state = ConnectionState::Connecting;
            shared.color = None;
            shared.enabled_menu_actions.clear();
            shared.pressed_buttons.clear();
            shared.joystick = (0.0, 0.0);
            // Dropping the old sender ends the old writer task, which
            // closes the superseded transport.
            shared.outbound = Some(frames_tx);
            shared.epoch
        };

        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        tokio::spawn(async move {
            run_connection(inner, epoch, name, url, frames_rx).await;
        });
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.inner.shared.lock().unwrap().state
    }

    /// Whether the game has accepted the player name and inputs may be
    /// sent. Prefer watching for [`ControllerEvent::Ready`] /
    /// [`ControllerEvent::Disconnected`] over polling this.
    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The color assigned by the game, if any has been pushed yet.
    pub fn color(&self) -> Option<PlayerColor> {
        self.inner.shared.lock().unwrap().color
    }

    /// The set of menu actions the game currently has enabled.
    pub fn enabled_menu_actions(&self) -> HashSet<MenuAction> {
        self.inner
            .shared
            .lock()
            .unwrap()
            .enabled_menu_actions
            .clone()
    }

    /// Reports a button press or release.
    ///
    /// Only transition edges go on the wire: repeating the current
    /// state sends nothing. There is no periodic resend either, so a
    /// lost frame leaves the game's view of the button wrong until the
    /// next edge — a documented limitation of the protocol.
    ///
    /// # Errors
    /// [`ClientError::NotReady`] if the connection is not ready.
    pub fn set_button(
        &self,
        button: Button,
        pressed: bool,
    ) -> Result<(), ClientError> {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.ensure_ready()?;

        if shared.pressed_buttons.contains(&button) == pressed {
            return Ok(());
        }

        let frame = JsonCodec.encode(&Message::Button { button, pressed })?;
        shared.send_frame(frame)?;

        if pressed {
            shared.pressed_buttons.insert(button);
        } else {
            shared.pressed_buttons.remove(&button);
        }
        Ok(())
    }

    /// Reports the joystick position.
    ///
    /// Both axes must lie in the closed interval [-1, 1]; anything else
    /// is rejected before a message is constructed. Unchanged positions
    /// send nothing.
    ///
    /// # Errors
    /// [`ClientError::JoystickOutOfRange`] for an axis outside [-1, 1],
    /// [`ClientError::NotReady`] if the connection is not ready.
    pub fn set_joystick_position(
        &self,
        vertical: f64,
        horizontal: f64,
    ) -> Result<(), ClientError> {
        if !(-1.0..=1.0).contains(&vertical)
            || !(-1.0..=1.0).contains(&horizontal)
        {
            return Err(ClientError::JoystickOutOfRange {
                vertical,
                horizontal,
            });
        }

        let mut shared = self.inner.shared.lock().unwrap();
        shared.ensure_ready()?;

        if shared.joystick == (vertical, horizontal) {
            return Ok(());
        }

        let frame = JsonCodec.encode(&Message::Joystick {
            vertical,
            horizontal,
        })?;
        shared.send_frame(frame)?;

        shared.joystick = (vertical, horizontal);
        Ok(())
    }

    /// Requests that an enabled menu action fire.
    ///
    /// The check is against the locally cached enabled set; the game
    /// re-validates on receipt, so a request that raced a disable is
    /// simply ignored by the game.
    ///
    /// # Errors
    /// [`ClientError::NotReady`] if the connection is not ready,
    /// [`ClientError::MenuActionNotEnabled`] if the game has not
    /// enabled `action`.
    pub fn trigger_menu_action(
        &self,
        action: MenuAction,
    ) -> Result<(), ClientError> {
        let mut shared = self.inner.shared.lock().unwrap();
        shared.ensure_ready()?;

        if !shared.enabled_menu_actions.contains(&action) {
            return Err(ClientError::MenuActionNotEnabled(action));
        }

        let frame =
            JsonCodec.encode(&Message::MenuActionTriggered { action })?;
        shared.send_frame(frame)
    }
}

impl Shared {
    fn ensure_ready(&self) -> Result<(), ClientError> {
        if self.state == ConnectionState::Connected {
            Ok(())
        } else {
            Err(ClientError::NotReady)
        }
    }

    /// Queues a frame for the writer task, fire-and-forget.
    fn send_frame(&mut self, frame: String) -> Result<(), ClientError> {
        let Some(outbound) = &self.outbound else {
            return Err(ClientError::NotReady);
        };
        // A send error means the connection task already terminated and
        // the Disconnected event is on its way.
        outbound.send(frame).map_err(|_| ClientError::NotReady)
    }
}

impl Inner {
    fn emit(&self, event: ControllerEvent) {
        // The consumer may have dropped the receiver; that is its
        // prerogative.
        let _ = self.events.send(event);
    }

    /// Terminal bookkeeping for a connection task. A superseded task
    /// (epoch mismatch) leaves state alone and emits nothing.
    fn finish(&self, epoch: u64, outcome: Outcome) {
        {
            let mut shared = self.shared.lock().unwrap();
            if shared.epoch != epoch {
                tracing::debug!(epoch, "superseded connection task ended");
                return;
            }
            shared.state = ConnectionState::NotConnected;
            shared.outbound = None;
        }

        match outcome {
            Outcome::Rejected(reason) => {
                tracing::info!(%reason, "game rejected connection");
                self.emit(ControllerEvent::ConnectFailure(reason));
            }
            Outcome::Faulted => {
                self.emit(ControllerEvent::Error);
                self.emit(ControllerEvent::Disconnected);
            }
            Outcome::Closed => {
                tracing::info!("connection to game closed");
                self.emit(ControllerEvent::Disconnected);
            }
        }
    }
}

/// Routes inbound messages into shared state and events.
///
/// Variants that only ever travel controller → game fall through to the
/// default no-op handlers.
struct Inbound<'a> {
    inner: &'a Inner,
    epoch: u64,
    rejection: Option<ConnectFailureReason>,
}

impl Inbound<'_> {
    /// Runs `apply` on the shared state if this task is still current,
    /// then emits the event it returns.
    fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut Shared) -> ControllerEvent,
    {
        let event = {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.epoch != self.epoch {
                return;
            }
            apply(&mut shared)
        };
        self.inner.emit(event);
    }
}

impl MessageHandler for Inbound<'_> {
    fn on_name_ok(&mut self) {
        let mut ready = false;
        {
            let mut shared = self.inner.shared.lock().unwrap();
            if shared.epoch == self.epoch
                && shared.state != ConnectionState::Connected
            {
                shared.state = ConnectionState::Connected;
                ready = true;
            }
        }
        if ready {
            tracing::info!("game accepted player name");
            self.inner.emit(ControllerEvent::Ready);
        }
    }

    fn on_name_taken(&mut self, name: &str) {
        tracing::debug!(name, "player name already taken");
        self.rejection = Some(ConnectFailureReason::NameAlreadyTaken);
    }

    fn on_max_players_reached(&mut self) {
        self.rejection = Some(ConnectFailureReason::MaxPlayersReached);
    }

    fn on_player_color(&mut self, color: PlayerColor) {
        self.update(|shared| {
            shared.color = Some(color);
            ControllerEvent::PlayerColorChanged(color)
        });
    }

    fn on_set_menu_action(&mut self, action: MenuAction, enabled: bool) {
        self.update(|shared| {
            if enabled {
                shared.enabled_menu_actions.insert(action);
            } else {
                shared.enabled_menu_actions.remove(&action);
            }
            ControllerEvent::MenuActionsChanged(
                shared.enabled_menu_actions.clone(),
            )
        });
    }
}

/// One full connection lifetime: open, announce, read until terminal.
async fn run_connection(
    inner: Arc<Inner>,
    epoch: u64,
    name: String,
    url: String,
    frames_rx: mpsc::UnboundedReceiver<String>,
) {
    let codec = JsonCodec;

    let conn = match WebSocketConnection::connect(&url).await {
        Ok(conn) => Arc::new(conn),
        Err(e) => {
            tracing::warn!(error = %e, url, "failed to open controller channel");
            inner.finish(epoch, Outcome::Faulted);
            return;
        }
    };
    let conn_id = conn.id();

    // Identity announcement goes out the moment the transport is open.
    let announce = match codec.encode(&Message::Name { name }) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode name announcement");
            let _ = conn.close().await;
            inner.finish(epoch, Outcome::Faulted);
            return;
        }
    };
    if let Err(e) = conn.send(&announce).await {
        tracing::warn!(%conn_id, error = %e, "name announcement failed");
        inner.finish(epoch, Outcome::Faulted);
        return;
    }

    // Writer task: drains queued outbound frames until the façade drops
    // the sender (superseded or terminal), then closes the socket.
    let writer_conn = Arc::clone(&conn);
    tokio::spawn(async move {
        let mut frames_rx = frames_rx;
        while let Some(frame) = frames_rx.recv().await {
            if let Err(e) = writer_conn.send(&frame).await {
                tracing::debug!(error = %e, "outbound send failed");
                break;
            }
        }
        let _ = writer_conn.close().await;
    });

    let outcome = read_loop(&inner, epoch, &codec, &conn, conn_id).await;
    let _ = conn.close().await;
    inner.finish(epoch, outcome);
}

async fn read_loop(
    inner: &Inner,
    epoch: u64,
    codec: &JsonCodec,
    conn: &WebSocketConnection,
    conn_id: padlink_transport::ConnectionId,
) -> Outcome {
    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Outcome::Closed,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Outcome::Faulted;
            }
        };

        let msg: Message = match codec.decode(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                // A frame we cannot decode means the peer speaks an
                // incompatible protocol; tear the connection down.
                tracing::warn!(%conn_id, error = %e, "undecodable frame");
                return Outcome::Faulted;
            }
        };

        let mut inbound = Inbound {
            inner,
            epoch,
            rejection: None,
        };
        msg.dispatch(&mut inbound);

        if let Some(reason) = inbound.rejection {
            return Outcome::Rejected(reason);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
