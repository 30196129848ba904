//! Core wire types for the padlink controller protocol.
//!
//! Everything in this module travels between a controller (a phone in a
//! browser) and the game process as one JSON text frame per message.
//! The same definitions serve both directions; which side is allowed to
//! send which variant is documented on [`Message`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Controller vocabulary
// ---------------------------------------------------------------------------

/// Identifier of a physical controller button.
///
/// Serialized as the variant name, e.g. `"Attack"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Attack,
    Pull,
    Carry,
    Press,
    Throw,
    Read,
    Open,
    UseBomb,
    Exit,
    JumpBack,
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A named menu capability the game can enable or disable per controller.
///
/// Controllers may only request actions the game currently has enabled
/// for them; the game re-validates on receipt either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuAction {
    StartGame,
    QuitGame,
    PauseGame,
    ResumeGame,
    Next,
    Back,
    Yes,
    No,
    ShowMap,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The color the game assigns to a player.
///
/// `Any` marks a player who may interact with objects of every color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Any,
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// ---------------------------------------------------------------------------
// Message — the wire taxonomy
// ---------------------------------------------------------------------------

/// A protocol message, one per transport frame.
///
/// `#[serde(tag = "type")]` produces a single flat JSON record with the
/// discriminant in a `"type"` field:
///
/// ```json
/// { "type": "Button", "button": "Attack", "pressed": true }
/// ```
///
/// A frame without a recognized `"type"` fails to decode; extra unknown
/// fields are ignored. No variant can carry another variant's fields —
/// that is enforced by this definition, not checked at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Controller → game: the player's chosen display name. Sent as the
    /// very first message once the transport is open.
    Name { name: String },

    /// Game → controller: the name is already in use by another
    /// controller. The game will not talk to this connection further.
    NameTaken { name: String },

    /// Game → controller: the maximum number of players is already
    /// connected.
    MaxPlayersReached,

    /// Game → controller: the name was accepted; the connection is now
    /// fully established and inputs may be sent.
    NameOk,

    /// Controller → game: a button transition edge (press or release).
    /// No message means "state unchanged" — there is no periodic resend.
    Button { button: Button, pressed: bool },

    /// Controller → game: joystick position, both axes in [-1, 1].
    Joystick { vertical: f64, horizontal: f64 },

    /// Game → controller: the color assigned to this player. May be
    /// pushed again at any time on reassignment.
    PlayerColor { color: PlayerColor },

    /// Game → controller: enable or disable one menu action. The union
    /// of all deltas received defines the currently enabled set.
    SetMenuAction { action: MenuAction, enabled: bool },

    /// Controller → game: request that an enabled menu action fire.
    /// The game is the final arbiter of whether it is still valid.
    MenuActionTriggered { action: MenuAction },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Per-variant handler seam for inbound messages.
///
/// Every method has a default no-op body, so implementors override only
/// the variants they care about — the equivalent of a match with
/// fall-through arms, but with the actual `match` centralized in
/// [`Message::dispatch`]. Adding a message variant is a compile error
/// there, never a silently unhandled case at runtime.
pub trait MessageHandler {
    fn on_name(&mut self, _name: &str) {}
    fn on_name_taken(&mut self, _name: &str) {}
    fn on_max_players_reached(&mut self) {}
    fn on_name_ok(&mut self) {}
    fn on_button(&mut self, _button: Button, _pressed: bool) {}
    fn on_joystick(&mut self, _vertical: f64, _horizontal: f64) {}
    fn on_player_color(&mut self, _color: PlayerColor) {}
    fn on_set_menu_action(&mut self, _action: MenuAction, _enabled: bool) {}
    fn on_menu_action_triggered(&mut self, _action: MenuAction) {}
}

impl Message {
    /// Routes this message to exactly one method of `handler`, chosen by
    /// the discriminant.
    ///
    /// This is the only place in the codebase that matches over the full
    /// taxonomy.
    pub fn dispatch<H: MessageHandler>(&self, handler: &mut H) {
        match self {
            Message::Name { name } => handler.on_name(name),
            Message::NameTaken { name } => handler.on_name_taken(name),
            Message::MaxPlayersReached => handler.on_max_players_reached(),
            Message::NameOk => handler.on_name_ok(),
            Message::Button { button, pressed } => {
                handler.on_button(*button, *pressed);
            }
            Message::Joystick {
                vertical,
                horizontal,
            } => handler.on_joystick(*vertical, *horizontal),
            Message::PlayerColor { color } => {
                handler.on_player_color(*color);
            }
            Message::SetMenuAction { action, enabled } => {
                handler.on_set_menu_action(*action, *enabled);
            }
            Message::MenuActionTriggered { action } => {
                handler.on_menu_action_triggered(*action);
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
