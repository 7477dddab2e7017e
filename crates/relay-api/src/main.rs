//! Agent relay entry point.
//!
//! Binary name: `relay`
//!
//! Parses CLI arguments, loads configuration and AWS credentials, then
//! serves the HTTP relay until Ctrl+C or SIGTERM.

mod cli;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use relay_infra::aws::AwsCredentials;
use relay_infra::config::{apply_env_overrides, load_relay_config};
use relay_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or AWS
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "relay", &mut std::io::stdout());
        return Ok(());
    }

    let filter = cli.log_filter();

    match cli.command {
        Commands::Serve {
            port,
            host,
            config,
            otel,
        } => {
            init_tracing(filter, otel)
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

            let mut relay_config = load_relay_config(&config).await;
            apply_env_overrides(&mut relay_config);
            tracing::info!(
                region = %relay_config.region,
                agent_id = %relay_config.agent.agent_id,
                agent_alias_id = %relay_config.agent.agent_alias_id,
                bucket = %relay_config.archive.bucket,
                "relay configuration loaded"
            );

            let credentials = AwsCredentials::from_env().context("loading AWS credentials")?;
            let state = AppState::init(&relay_config, credentials)?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            tracing::info!("relay listening on http://{addr}");

            let router = http::router::build_router(state);
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await;

            tracing::info!("server stopped");
            shutdown_tracing();
            served?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
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
}
