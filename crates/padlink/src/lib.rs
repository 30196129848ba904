//! # Padlink
//!
//! Client library for driving a game session from a hand-held
//! controller over WebSockets.
//!
//! The game acts as the server; each controller opens one connection to
//! `/sockets/`, announces a player name, and once accepted streams
//! input (buttons, joystick, menu actions) while the game pushes
//! per-player presentation state back. A separate one-shot channel at
//! `/diagnostics/` reports session health to lobby screens.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use padlink::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut events) = ControllerClient::new();
//!     client.connect("Alice", "192.168.0.17", DEFAULT_PORT);
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             ControllerEvent::Ready => {
//!                 let _ = client.set_joystick_position(0.0, 1.0);
//!             }
//!             ControllerEvent::Disconnected => break,
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod client;
mod diagnostics;
mod error;
mod event;

pub use client::{ControllerClient, DEFAULT_PORT};
pub use diagnostics::{get_diagnostics, DEFAULT_DIAGNOSTICS_TIMEOUT};
pub use error::{ClientError, DiagnosticsError, PadlinkError};
pub use event::{ConnectFailureReason, ConnectionState, ControllerEvent};

// Re-exported so applications depend on `padlink` alone.
pub use padlink_protocol::{
    Button, DiagnosticsSnapshot, MenuAction, Message, MessageHandler,
    PlayerColor, ProtocolError,
};
pub use padlink_transport::TransportError;

/// Convenience imports for applications.
pub mod prelude {
    pub use crate::{
        Button, ConnectFailureReason, ConnectionState, ControllerClient,
        ControllerEvent, MenuAction, PadlinkError, PlayerColor,
        DEFAULT_DIAGNOSTICS_TIMEOUT, DEFAULT_PORT,
    };
    pub use crate::{get_diagnostics, DiagnosticsSnapshot};
}
