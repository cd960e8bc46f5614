use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use dockbot::app::{Navigator, Operator};
use dockbot::config::{load_config, AppConfig, BackendKind};
use dockbot::docker::cli::DockerCli;
use dockbot::docker::client::DockerClient;
use dockbot::docker::{ContainerBackend, TimedBackend};
use dockbot::telegram::api::TelegramClient;
use dockbot::telegram::poller;

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dockbot=info".into()),
        )
        .init();
}

fn build_backend(config: &AppConfig) -> Result<Box<dyn ContainerBackend>> {
    let backend: Box<dyn ContainerBackend> = match config.backend {
        BackendKind::Api => {
            let client = DockerClient::new().context("Failed to connect to Docker")?;
            Box::new(TimedBackend::new(client, config.action_timeout(), config.logs_timeout()))
        }
        BackendKind::Cli => Box::new(TimedBackend::new(
            DockerCli::new(config.docker_bin.clone()),
            config.action_timeout(),
            config.logs_timeout(),
        )),
    };
    Ok(backend)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let config = load_config()?;
    info!(
        "Starting dockbot (backend: {:?}, page size: {})",
        config.backend, config.page_size
    );

    let backend = build_backend(&config)?;
    let navigator = Arc::new(Navigator::new(
        backend,
        Operator(config.allowed_user_id),
        config.page_size,
        config.max_fragment_len,
    ));
    let client = TelegramClient::new(&config.api_base_url, &config.bot_token, config.poll_timeout())
        .context("Failed to build Telegram client")?;

    poller::run(client, navigator, config.poll_timeout(), shutdown_signal()).await;
    Ok(())
}
