//! Telegram front end for the proxy checker
//!
//! Receives uploaded proxy lists, runs them through the batch verifier and
//! sends the results back to the chat. At most one run per chat is in flight.

mod handler;
mod lock;
mod progress;

pub use handler::{schema, BotState, Command};
pub use lock::{RunGuard, RunLocks};
pub use progress::ChatProgress;

use crate::{Config, Result};
use log::info;
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::Arc;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;

/// How the bot receives updates
#[derive(Debug, Clone)]
pub enum UpdateSource {
    Polling,
    Webhook { url: Url, listen: SocketAddr },
}

/// Run the bot until interrupted
pub async fn serve(token: String, config: Config, source: UpdateSource) -> Result<()> {
    let bot = Bot::new(token);
    let state = Arc::new(BotState::new(config)?);

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![state])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match source {
        UpdateSource::Polling => {
            info!("Starting bot with long polling");
            dispatcher.dispatch().await;
        }
        UpdateSource::Webhook { url, listen } => {
            info!("Starting bot with webhook {} on {}", url, listen);
            let listener = webhooks::axum(bot, webhooks::Options::new(listen, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    Ok(())
}
