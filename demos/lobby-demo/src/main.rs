//! Minimal terminal controller: connects to a running game, prints
//! every event, and starts the game as soon as the game offers it.
//!
//! Usage: `lobby-demo <player-name> [address] [port]`

use std::time::Duration;

use padlink::prelude::*;

#[tokio::main]
async fn main() -> Result<(), PadlinkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Player".to_string());
    let address = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port = args
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    // Check session health first, the way a lobby screen would.
    match get_diagnostics(&address, port, DEFAULT_DIAGNOSTICS_TIMEOUT).await {
        Ok(snapshot) if snapshot.players_with_lost_connection.is_empty() => {
            eprintln!("game is healthy, joining as {name}");
        }
        Ok(snapshot) => {
            eprintln!(
                "players waiting to reconnect: {:?}",
                snapshot.players_with_lost_connection
            );
        }
        Err(e) => eprintln!("diagnostics unavailable ({e}), joining anyway"),
    }

    let (client, mut events) = ControllerClient::new();
    client.connect(&name, &address, port);

    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::Ready => {
                eprintln!("connected, waving the joystick");
                client.set_joystick_position(0.0, 1.0)?;
                client.set_joystick_position(0.0, 0.0)?;
            }
            ControllerEvent::PlayerColorChanged(color) => {
                eprintln!("assigned color {color}");
            }
            ControllerEvent::MenuActionsChanged(actions) => {
                eprintln!("menu actions now enabled: {actions:?}");
                if actions.contains(&MenuAction::StartGame) {
                    client.trigger_menu_action(MenuAction::StartGame)?;
                    eprintln!("requested game start");
                }
            }
            ControllerEvent::ConnectFailure(reason) => {
                eprintln!("game refused us: {reason}");
                return Ok(());
            }
            ControllerEvent::Error => eprintln!("connection error"),
            ControllerEvent::Disconnected => {
                eprintln!("disconnected, retrying in 2s");
                tokio::time::sleep(Duration::from_secs(2)).await;
                client.connect(&name, &address, port);
            }
        }
    }
    Ok(())
}
