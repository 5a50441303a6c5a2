mod domain;
mod clients;

mod app_system;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod user_actor;
mod product_actor;
mod order_actor;

mod api;
mod config;
mod discord;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, info_span, warn, Instrument};

use crate::api::ApiState;
use crate::app_system::{setup_tracing, OrderSystem};
use crate::discord::{
    CommandHandler, Destinations, DiscordBot, NotificationWorker, Notifier, SerenitySink,
};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load_config().context("Failed to load configuration")?;
    setup_tracing(&config.log_level);

    info!(?config, "Starting storefront order service");

    let system = OrderSystem::new();
    if config.seed_sample_products {
        system
            .seed_sample_products()
            .instrument(info_span!("seed"))
            .await
            .context("Failed to seed sample products")?;
    }
    let storage = system.storage();

    // Discord stays off entirely without a token; the HTTP API is unaffected.
    let (notifier, worker, bot) = match config.discord.bot_token() {
        Some(token) => {
            let (notifier, receiver) = Notifier::channel(config.discord.queue_capacity);
            let worker = NotificationWorker::new(
                receiver,
                Arc::new(SerenitySink::from_token(token)),
                Destinations::from_config(&config.discord),
                config.discord.send_timeout(),
            );
            let worker = tokio::spawn(worker.run());

            let commands = CommandHandler::new(
                storage.clone(),
                notifier.clone(),
                config.discord.admin_ids(),
            );
            let bot = match DiscordBot::start(&config.discord, commands)
                .instrument(info_span!("discord_startup"))
                .await
            {
                Ok(bot) => Some(bot),
                Err(e) => {
                    error!(error = %e, "Failed to start Discord bot");
                    None
                }
            };
            (notifier, Some(worker), bot)
        }
        None => {
            info!("Discord bot token not found, skipping bot initialization");
            (Notifier::disabled(), None, None)
        }
    };

    let app = api::router(ApiState::new(storage, notifier));
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    if let Some(bot) = bot {
        bot.shutdown().await;
    }
    // Every notifier clone is gone now, so the worker finishes once the queue is empty.
    if let Some(worker) = worker {
        match tokio::time::timeout(DRAIN_TIMEOUT, worker).await {
            Ok(Ok(())) => info!("Notification queue drained"),
            Ok(Err(e)) => error!(error = %e, "Notification worker failed"),
            Err(_) => warn!("Timed out draining notification queue"),
        }
    }

    system.shutdown().await.context("Failed to shut down order system")?;
    info!("Application completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
