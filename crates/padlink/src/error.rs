//! Error types for the client layer, plus the unified [`PadlinkError`].

use padlink_protocol::{MenuAction, ProtocolError};
use padlink_transport::TransportError;

/// Errors returned synchronously by [`ControllerClient`] operations.
///
/// These are precondition failures — programming errors in the caller,
/// not recoverable protocol events. Protocol events (rejection, loss of
/// connection) arrive as [`ControllerEvent`]s instead.
///
/// [`ControllerClient`]: crate::ControllerClient
/// [`ControllerEvent`]: crate::ControllerEvent
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Input was sent before the game accepted the player name, or
    /// after the connection went away.
    #[error("cannot send input while the connection is not ready")]
    NotReady,

    /// A joystick axis was outside the closed interval [-1, 1].
    /// Rejected before any message is constructed.
    #[error(
        "joystick position ({vertical}, {horizontal}) outside [-1, 1]"
    )]
    JoystickOutOfRange { vertical: f64, horizontal: f64 },

    /// The menu action is not in the currently enabled set.
    #[error("menu action {0} has not been enabled by the game")]
    MenuActionNotEnabled(MenuAction),

    /// Encoding the outbound message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors settling a diagnostics probe.
///
/// Exactly one of these (or a snapshot) resolves each probe; the
/// variants stay distinct because the caller's recovery differs.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    /// The side channel closed before a snapshot arrived.
    #[error("connection closed before a diagnostics snapshot arrived")]
    ConnectionClosed,

    /// The side channel experienced a transport error.
    #[error("the diagnostics connection experienced an error")]
    Connection(#[source] TransportError),

    /// The configured timeout elapsed first.
    #[error("timed out before a diagnostics snapshot arrived")]
    TimedOut,

    /// The snapshot frame failed to decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Top-level error that wraps all crate-specific errors.
///
/// Applications using the `padlink` crate can funnel every fallible
/// call through this single type; the `#[from]` attributes let `?`
/// convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PadlinkError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A client precondition failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A diagnostics probe failure.
    #[error(transparent)]
    Diagnostics(#[from] DiagnosticsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: PadlinkError = err.into();
        assert!(matches!(top, PadlinkError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_client_error() {
        let err = ClientError::NotReady;
        let top: PadlinkError = err.into();
        assert!(matches!(top, PadlinkError::Client(_)));
    }

    #[test]
    fn test_from_diagnostics_error() {
        let err = DiagnosticsError::TimedOut;
        let top: PadlinkError = err.into();
        assert!(matches!(top, PadlinkError::Diagnostics(_)));
        assert!(top.to_string().contains("timed out"));
    }

    #[test]
    fn test_joystick_error_reports_both_axes() {
        let err = ClientError::JoystickOutOfRange {
            vertical: 1.5,
            horizontal: -2.0,
        };
        let text = err.to_string();
        assert!(text.contains("1.5"));
        assert!(text.contains("-2"));
    }
}
