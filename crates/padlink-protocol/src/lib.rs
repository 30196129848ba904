//! Wire protocol for padlink.
//!
//! This crate defines the language that controllers and the game speak:
//!
//! - **Types** ([`Message`], [`Button`], [`MenuAction`], [`PlayerColor`],
//!   [`DiagnosticsSnapshot`]) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures
//!   become text frames and back.
//! - **Dispatch** ([`MessageHandler`]) — the per-variant handler seam
//!   with default no-op handlers.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and the
//! client state machine. It knows nothing about sockets, readiness, or
//! reconnection — it only knows how to serialize, deserialize, and
//! route messages.
//!
//! ```text
//! Transport (frames) → Protocol (Message) → Client (connection state)
//! ```

mod codec;
mod diagnostics;
mod error;
mod message;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use diagnostics::DiagnosticsSnapshot;
pub use error::ProtocolError;
pub use message::{Button, MenuAction, Message, MessageHandler, PlayerColor};
