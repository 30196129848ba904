//! One-shot diagnostics probe.
//!
//! The game exposes a side channel at `/diagnostics/` that pushes a
//! single health snapshot to anyone who connects. [`get_diagnostics`]
//! opens that channel, waits for the snapshot, and settles on exactly
//! one of four outcomes: the snapshot, a clean close, a transport
//! error, or a timeout.

use std::time::Duration;

use padlink_protocol::{Codec, DiagnosticsSnapshot, JsonCodec};
use padlink_transport::{Connection, WebSocketConnection};

use crate::error::DiagnosticsError;

/// Default time to wait for a snapshot before giving up.
pub const DEFAULT_DIAGNOSTICS_TIMEOUT: Duration = Duration::from_millis(1000);

/// Fetches one health snapshot from the game's diagnostics channel.
///
/// Independent of any [`ControllerClient`](crate::ControllerClient):
/// lobby screens call this to decide whether to offer "reconnect"
/// buttons before a controller connection exists.
///
/// # Errors
/// [`DiagnosticsError::TimedOut`] if `timeout` elapses first,
/// [`DiagnosticsError::ConnectionClosed`] if the game closes the channel
/// without sending a snapshot, [`DiagnosticsError::Connection`] for
/// transport failures, [`DiagnosticsError::Protocol`] if the snapshot
/// frame does not decode.
pub async fn get_diagnostics(
    address: &str,
    port: u16,
    timeout: Duration,
) -> Result<DiagnosticsSnapshot, DiagnosticsError> {
    let url = format!("ws://{address}:{port}/diagnostics/");
    tracing::debug!(url, ?timeout, "probing diagnostics channel");

    match tokio::time::timeout(timeout, probe(&url)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(url, "diagnostics probe timed out");
            Err(DiagnosticsError::TimedOut)
        }
    }
}

async fn probe(url: &str) -> Result<DiagnosticsSnapshot, DiagnosticsError> {
    let conn = WebSocketConnection::connect(url)
        .await
        .map_err(DiagnosticsError::Connection)?;

    let result = match conn.recv().await {
        Ok(Some(frame)) => {
            let snapshot = JsonCodec.decode(&frame)?;
            Ok(snapshot)
        }
        Ok(None) => Err(DiagnosticsError::ConnectionClosed),
        Err(e) => Err(DiagnosticsError::Connection(e)),
    };

    // The probe is one-shot; the channel is useless after the first
    // frame either way.
    let _ = conn.close().await;
    result
}
