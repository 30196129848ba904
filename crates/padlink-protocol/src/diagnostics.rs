//! Wire format of the diagnostics side channel.
//!
//! The diagnostics endpoint is independent of the main controller
//! channel: the game pushes exactly one snapshot per connection and may
//! then close. Controllers use it before reconnecting to decide whether
//! to silently resume under a previous name or to prompt the user.

use serde::{Deserialize, Serialize};

/// A one-shot report of the game's connection bookkeeping.
///
/// Field names are camelCase on the wire, matching what the game's
/// diagnostics service emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    /// Display names of players the game currently records as having
    /// lost their connection.
    pub players_with_lost_connection: Vec<String>,
}
