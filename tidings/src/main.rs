//! # Tidings
//!
//! Notification daemon for a QuickShell desktop.
//!
//! ## Features
//!
//! - **Freedesktop Notifications**: owns `org.freedesktop.Notifications` on the session bus
//! - **Notification History**: the latest 100 notifications since daemon start
//! - **Do Not Disturb**: record everything, show nothing
//! - **Popups**: one external popup process per notification
//! - **Control Socket**: line-delimited JSON for the status bar

mod config;
mod control;
mod dbus;
mod history;
mod notification;
mod popup;
mod registry;
mod service;

use crate::control::{ControlServer, SocketGuard};
use crate::history::NotificationHistory;
use crate::popup::CommandLauncher;
use crate::registry::Registry;
use crate::service::NotificationService;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Tidings - notification daemon
#[derive(Parser, Debug)]
#[command(name = "tidingsd", version, about)]
struct Args {
    /// Configuration file [default: $XDG_CONFIG_HOME/tidings/tidings.yaml]
    #[arg(short, long, env = "TIDINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Control socket path [default: $XDG_RUNTIME_DIR/qs-notifications.sock]
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Tidings v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;

    // Initialize components
    let mut history = NotificationHistory::new(config.history.max_size, config.history.file_path());
    history.load().await;

    let launcher = Arc::new(CommandLauncher::new(config.popup.clone()));
    let (signal_tx, signal_rx) = mpsc::channel(100);
    let service = NotificationService::new(Registry::new(history), launcher, signal_tx);

    // Control socket first, so the bar can connect as soon as we own the bus name
    let socket_path = args.socket.unwrap_or_else(libtidings_ipc::paths::socket_path);
    let listener = ControlServer::bind(&socket_path)?;
    let _socket_guard = SocketGuard(socket_path);

    // Losing the name race is fatal
    let connection = dbus::serve(service.clone()).await?;

    tokio::spawn(async move {
        if let Err(e) = dbus::forward_signals(connection, signal_rx).await {
            error!("Signal forwarder stopped: {:#}", e);
        }
    });

    info!("Notification daemon started");

    let control = ControlServer::new(service);
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = control.serve(listener) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown"),
        _ = sigterm.recv() => info!("Shutdown"),
    }

    Ok(())
}
