//! tidingsctl - status-bar bridge for the Tidings daemon

mod bar;

use crate::bar::BridgeState;
use anyhow::Result;
use clap::{Parser, Subcommand};
use libtidings_ipc::{paths, ControlClient, HistorySnapshot};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Tidings status-bar bridge
#[derive(Parser)]
#[command(name = "tidingsctl", version, about = "Status-bar bridge for the Tidings notification daemon")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Control socket path [default: $XDG_RUNTIME_DIR/qs-notifications.sock]
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Bridge state file [default: $XDG_CACHE_HOME/qs-notifications/state.json]
    #[arg(long)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Waybar module JSON (default)
    Waybar,

    /// Mark every current notification as seen
    Seen,

    /// Flip do-not-disturb
    ToggleDnd,

    /// Print history and DND state
    Status,
}

/// An unreachable daemon renders as "nothing to show"
async fn fetch(client: &ControlClient) -> HistorySnapshot {
    client.get_history().await.unwrap_or_else(|e| {
        warn!("Daemon unavailable: {}", e);
        HistorySnapshot::default()
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ControlClient::with_socket(cli.socket.unwrap_or_else(paths::socket_path));
    let state_path = cli.state.unwrap_or_else(paths::bridge_state_path);

    match cli.command.unwrap_or(Commands::Waybar) {
        Commands::Waybar => {
            let snapshot = fetch(&client).await;
            let state = BridgeState::load(&state_path);
            let output = bar::render(&snapshot, state.seen_count);
            println!("{}", serde_json::to_string(&output)?);
        }

        Commands::Seen => {
            let snapshot = fetch(&client).await;
            let state = BridgeState {
                seen_count: snapshot.history.len(),
            };
            if let Err(e) = state.save(&state_path) {
                warn!("Failed to save bridge state: {:#}", e);
            }
        }

        Commands::ToggleDnd => {
            let snapshot = fetch(&client).await;
            if let Err(e) = client.set_dnd(!snapshot.dnd).await {
                warn!("Failed to toggle DND: {}", e);
            }
        }

        Commands::Status => {
            let snapshot = fetch(&client).await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
