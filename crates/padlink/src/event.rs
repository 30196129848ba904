//! Events emitted by the connection state machine.
//!
//! The original callback-per-field wiring (`onReady`, `onDisconnect`,
//! ...) is expressed here as a single event enum delivered over a
//! channel: each lifecycle transition produces exactly one event, and
//! consumers simply ignore the variants they do not care about.

use std::collections::HashSet;
use std::fmt;

use padlink_protocol::{MenuAction, PlayerColor};

/// Why the game refused to establish a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailureReason {
    /// A controller is already connected under the same player name.
    /// Recovery: pick a different name.
    NameAlreadyTaken,

    /// The maximum number of players is already connected.
    MaxPlayersReached,
}

impl fmt::Display for ConnectFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameAlreadyTaken => write!(f, "name already taken"),
            Self::MaxPlayersReached => write!(f, "max players reached"),
        }
    }
}

/// Lifecycle state of the controller connection.
///
/// ```text
///   NotConnected ──(connect)──→ Connecting ──(NameOk)──→ Connected
///        ↑                          │                        │
///        └────(rejected / closed)───┴────(closed / error)────┘
/// ```
///
/// There is no retry state: reconnection is a fresh
/// [`connect`](crate::ControllerClient::connect) call by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, or the previous one terminated.
    NotConnected,

    /// Transport open, identity announced, acceptance pending.
    Connecting,

    /// Identity accepted; inputs may be sent.
    Connected,
}

/// A notification from the connection state machine.
///
/// Delivered in transport order on the channel returned by
/// [`ControllerClient::new`](crate::ControllerClient::new). Lifecycle
/// events (`Ready`, `ConnectFailure`, `Disconnected`) fire exactly once
/// per transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The game accepted the player name; the connection is ready.
    Ready,

    /// The game refused the connection for the given reason. The client
    /// has already closed the transport.
    ConnectFailure(ConnectFailureReason),

    /// The transport closed while a connection was being established or
    /// in use.
    Disconnected,

    /// The transport reported an error. Usually followed by
    /// `Disconnected`.
    Error,

    /// The game assigned (or reassigned) this player's color.
    PlayerColorChanged(PlayerColor),

    /// The enabled menu-action set changed; carries the full updated set.
    MenuActionsChanged(HashSet<MenuAction>),
}
