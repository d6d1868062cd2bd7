use clap::Parser;
use signaldesk::cli::commands::{Cli, Commands};
use signaldesk::config::AppConfig;
use signaldesk::domain::values::position_status::PositionStatus;
use signaldesk::SignalDesk;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = match AppConfig::load(Some(&cli.config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let desk = match SignalDesk::open(config) {
        Ok(desk) => desk,
        Err(e) => {
            eprintln!("Error initializing signaldesk: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(desk, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(desk: SignalDesk, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Run => {
            let cancel = CancellationToken::new();
            let dispatcher = desk.start_dispatcher(cancel.clone());
            let watcher = Arc::new(desk.watcher(Arc::new(dispatcher.sender())));
            let lifecycle = desk.lifecycle();
            tokio::join!(
                watcher.clone().run(cancel.clone()),
                lifecycle.run(cancel.clone()),
                cancel_on_ctrl_c(cancel.clone())
            );
            drop(watcher);
            dispatcher.shutdown().await;
        }
        Commands::Watch => {
            let cancel = CancellationToken::new();
            let dispatcher = desk.start_dispatcher(cancel.clone());
            let watcher = Arc::new(desk.watcher(Arc::new(dispatcher.sender())));
            tokio::join!(
                watcher.clone().run(cancel.clone()),
                cancel_on_ctrl_c(cancel.clone())
            );
            drop(watcher);
            dispatcher.shutdown().await;
        }
        Commands::Lifecycle => {
            let cancel = CancellationToken::new();
            let lifecycle = desk.lifecycle();
            tokio::join!(lifecycle.run(cancel.clone()), cancel_on_ctrl_c(cancel.clone()));
        }
        Commands::Poll { since_hours } => {
            let cancel = CancellationToken::new();
            let dispatcher = desk.start_dispatcher(cancel.clone());
            let since = chrono::Utc::now() - chrono::Duration::hours(since_hours);
            let watcher = desk.watcher_since(Arc::new(dispatcher.sender()), since);
            let results = watcher.poll_all_once().await;
            drop(watcher);
            println!("{}", serde_json::to_string_pretty(&results)?);
            tokio::select! {
                _ = dispatcher.shutdown() => {}
                _ = cancel_on_ctrl_c(cancel.clone()) => {}
            }
        }
        Commands::Analyze { link, title } => {
            let decision = desk.analyze(link, title).await;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::CloseExpired => {
            let report = desk.close_expired().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Positions { status, ticker, limit } => {
            let status: Option<PositionStatus> = status
                .map(|s| s.parse())
                .transpose()
                .map_err(|e: String| e)?;
            let positions = desk.positions(status, ticker, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&positions)?);
        }
        Commands::Decisions { limit } => {
            let decisions = desk.decisions(limit)?;
            println!("{}", serde_json::to_string_pretty(&decisions)?);
        }
        Commands::News { link } => {
            let stored = desk.news(&link)?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
        }
        Commands::Backfill { limit } => {
            let decisions = desk.backfill(limit).await?;
            println!("{}", serde_json::to_string_pretty(&decisions)?);
        }
    }
    Ok(())
}

/// Cancels `cancel` on Ctrl-C. Returns as soon as the token is cancelled.
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
            }
            tracing::info!("shutdown requested");
        }
        _ = cancel.cancelled() => {}
    }
    cancel.cancel();
}
