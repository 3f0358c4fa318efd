//! golem - Pump19 chat bot
//!
//! Announces new codefall entries to every joined channel and answers chat
//! commands (`codefall`, `mult`, `help`, `bingo`).

mod codefall;
mod config;
mod db;
mod error;
mod handlers;
mod network;
mod state;
#[cfg(test)]
mod testing;
mod workers;

use crate::codefall::{Announcer, NotificationListener};
use crate::config::Config;
use crate::db::{Database, EntryStore, PgNotificationSource};
use crate::handlers::Registry;
use crate::network::{ChatHandle, Session};
use crate::state::{ChannelRegistry, LifecycleManager};
use crate::workers::WorkerPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Capacity of the outgoing chat queue.
const OUTGOING_QUEUE: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration: a TOML file when given, the environment otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::from_env().map_err(|e| {
            error!(error = %e, "Failed to load config from environment");
            e
        })?,
    };

    if let Err(errors) = crate::config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!(
        host = %config.irc.host,
        nick = %config.irc.nick,
        channels = config.irc.channels.len(),
        "Starting golem"
    );

    // Store and subscription
    let db = Database::connect(&config.database).await?;
    let source = PgNotificationSource::listen(db.pool(), &config.codefall.channel).await?;
    let store: Arc<dyn EntryStore> = Arc::new(db);

    let lifecycle = LifecycleManager::new();
    let channels = ChannelRegistry::new();
    let (chat, outgoing) = ChatHandle::new(OUTGOING_QUEUE);

    // Codefall: listener -> queue -> announcer
    let (announce_tx, announce_rx) = mpsc::channel(config.codefall.queue);
    let announcer = Announcer::new(channels.clone(), chat.clone(), config.codefall.url.clone());
    let announcer_task = tokio::spawn(announcer.run(announce_rx));

    let listener = NotificationListener::new(
        source,
        Arc::clone(&store),
        WorkerPool::new("codefall", config.codefall.workers),
        announce_tx,
        config.codefall.channel.clone(),
        config.codefall.keepalive(),
    );
    let listener_task = tokio::spawn(listener.run(lifecycle.subscribe()));

    // Chat. The session subscribes before any signal can be delivered.
    let commands = Registry::with_defaults(&config.commands, &config.codefall.url, store)?;
    let session = Session::new(config.irc.clone(), Arc::new(commands), channels, chat);
    let session_shutdown = lifecycle.subscribe();

    // Signals: the first one shuts down gracefully, a second one exits
    {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            lifecycle.shutdown("signal");
            wait_for_signal().await;
            warn!("Second signal received, exiting immediately");
            std::process::exit(1);
        });
    }

    let result = match lifecycle.until_shutdown(network::connect(&config.irc)).await {
        Some(Ok(stream)) => session.run(stream, outgoing, session_shutdown).await,
        Some(Err(e)) => Err(e),
        None => {
            info!("Shutdown requested before the chat connection was up");
            Ok(())
        }
    };

    // Whatever ended the session ends everything else too
    lifecycle.shutdown("chat session ended");
    if let Err(e) = listener_task.await {
        error!(error = %e, "Notification listener panicked");
    }
    if let Err(e) = announcer_task.await {
        error!(error = %e, "Announcer panicked");
    }

    match result {
        Ok(()) => {
            info!("golem stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Chat connection failed");
            Err(e.into())
        }
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
