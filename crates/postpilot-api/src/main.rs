//! PostPilot CLI and REST API entry point.
//!
//! Binary name: `postpilot`
//!
//! Parses CLI arguments, sets up logging, then dispatches to the requested
//! command or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{ChatsAction, Cli, Commands};
use postpilot_observe::{LogFormat, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity; RUST_LOG wins when set.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,postpilot=debug",
        _ => "trace",
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(filter, format, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "postpilot", &mut std::io::stdout());
        return Ok(());
    }

    // The chat client only talks HTTP
    if let Commands::Chat { user, server } = &cli.command {
        return cli::chat::loop_runner::run_chat_loop(user, server).await;
    }

    // Initialize application state (config, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(%addr, database = %state.database_url, "Starting API server");
            if !cli.quiet {
                println!(
                    "  {} PostPilot API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Chats { action } => match action {
            ChatsAction::List {
                user,
                page,
                limit,
                full,
            } => {
                cli::chats::list_chats(&state, &user, page, limit, full, cli.json).await?;
            }
            ChatsAction::Show { id } => {
                cli::chats::show_chat(&state, &id, cli.json).await?;
            }
            ChatsAction::Delete { id, force } => {
                cli::chats::delete_chat(&state, &id, force, cli.json).await?;
            }
        },

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Chat { .. } | Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
