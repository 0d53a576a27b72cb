//! Telegram update handlers

use crate::bot::lock::{RunGuard, RunLocks};
use crate::bot::progress::ChatProgress;
use crate::proxy::input::{load_candidates, validate_upload, InputError};
use crate::proxy::report::{VerificationReport, ACTIVE_FILE_NAME, DEAD_FILE_NAME};
use crate::proxy::verifier::BatchVerifier;
use crate::{Config, Result};
use log::{error, info, warn};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Document, InputFile};
use teloxide::utils::command::BotCommands;
use teloxide::{DownloadError, RequestError};
use thiserror::Error;

const WELCOME_TEXT: &str = "🤖 Welcome to Proxy Scanner Bot!\n\n\
Send me a text file containing proxies (max 500) in format:\n\
- proxy:port\n\
- proxy,port,countrycode,isp\n\n\
I will check them and send back active and dead lists.";

const BUSY_TEXT: &str = "Please wait, your previous request is still processing.";

const FAILURE_TEXT: &str = "❌ An error occurred while processing your file.";

/// Bot commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "show the welcome message.")]
    Start,
    #[command(description = "display this text.")]
    Help,
}

/// State shared by every handler
pub struct BotState {
    pub config: Config,
    pub verifier: BatchVerifier,
    pub locks: RunLocks<ChatId>,
}

impl BotState {
    pub fn new(config: Config) -> Result<Self> {
        let verifier = config.build_verifier()?;
        Ok(Self {
            config,
            verifier,
            locks: RunLocks::new(),
        })
    }
}

/// Failures that end a run early
#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("telegram request failed: {0}")]
    Request(#[from] RequestError),
    #[error("file download failed: {0}")]
    Download(#[from] DownloadError),
}

/// Build the update handler tree
pub fn schema() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter_map(|msg: Message| msg.document().cloned()).endpoint(handle_document))
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    let text = match cmd {
        Command::Start => WELCOME_TEXT.to_string(),
        Command::Help => Command::descriptions().to_string(),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_document(
    bot: Bot,
    msg: Message,
    doc: Document,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    let mime_type = doc.mime_type.as_ref().map(|m| m.to_string());
    if let Err(e) = validate_upload(
        doc.file_name.as_deref(),
        mime_type.as_deref(),
        u64::from(doc.file.size),
        state.config.max_file_size,
    ) {
        info!("{}", rejection_log(chat_id, &e));
        bot.send_message(chat_id, e.to_string()).await?;
        return Ok(());
    }

    let Some(guard) = state.locks.try_acquire(chat_id) else {
        bot.send_message(chat_id, BUSY_TEXT).await?;
        return Ok(());
    };

    // The run outlives this handler so later uploads from the chat see the lock
    tokio::spawn(run_for_chat(bot, doc, state, guard));
    Ok(())
}

fn rejection_log(chat_id: ChatId, e: &InputError) -> String {
    match e {
        InputError::NotPlainText => format!("Rejected non-text upload from chat {}", chat_id),
        InputError::FileTooLarge { size, max } => {
            format!("Rejected {} byte upload from chat {} (limit {})", size, chat_id, max)
        }
        InputError::NoValidProxies => format!("No valid proxies in upload from chat {}", chat_id),
        InputError::TooManyProxies { count, max } => {
            format!("Rejected {} proxies from chat {} (limit {})", count, chat_id, max)
        }
    }
}

async fn run_for_chat(bot: Bot, doc: Document, state: Arc<BotState>, guard: RunGuard<ChatId>) {
    let chat_id = *guard.key();

    let reply = match process_document(&bot, chat_id, &doc, &state).await {
        Ok(()) => None,
        Err(RunError::Input(e)) => {
            info!("{}", rejection_log(chat_id, &e));
            Some(e.to_string())
        }
        Err(e) => {
            error!("Run for chat {} failed: {}", chat_id, e);
            Some(FAILURE_TEXT.to_string())
        }
    };

    if let Some(text) = reply {
        if let Err(e) = bot.send_message(chat_id, text).await {
            warn!("Failed to notify chat {}: {}", chat_id, e);
        }
    }

    drop(guard);
}

async fn process_document(
    bot: &Bot,
    chat_id: ChatId,
    doc: &Document,
    state: &BotState,
) -> std::result::Result<(), RunError> {
    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut buffer = Vec::new();
    bot.download_file(&file.path, &mut buffer).await?;
    let content = String::from_utf8_lossy(&buffer);

    let proxies = load_candidates(&content, state.config.max_proxies)?;

    bot.send_message(
        chat_id,
        format!("🔍 Found {} proxies. Checking them now...", proxies.len()),
    )
    .await?;

    let progress = ChatProgress::new(bot.clone(), chat_id);
    let report = state.verifier.verify(proxies, &progress).await;
    progress.finish().await;

    send_results(bot, chat_id, &report).await?;
    bot.send_message(chat_id, report.summary()).await?;
    Ok(())
}

async fn send_results(
    bot: &Bot,
    chat_id: ChatId,
    report: &VerificationReport,
) -> std::result::Result<(), RequestError> {
    let files = [
        (ACTIVE_FILE_NAME, report.active_content()),
        (DEAD_FILE_NAME, report.dead_content()),
    ];

    for (name, content) in files {
        // Telegram refuses empty uploads; the summary still reports zero
        if content.is_empty() {
            continue;
        }
        let file = InputFile::memory(content.into_bytes()).file_name(name);
        bot.send_document(chat_id, file).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert!(matches!(Command::parse("/start", "bot"), Ok(Command::Start)));
        assert!(matches!(Command::parse("/help", "bot"), Ok(Command::Help)));
        assert!(Command::parse("/unknown", "bot").is_err());
    }

    #[test]
    fn test_welcome_text_mentions_formats() {
        assert!(WELCOME_TEXT.contains("proxy:port"));
        assert!(WELCOME_TEXT.contains("proxy,port,countrycode,isp"));
        assert!(WELCOME_TEXT.contains("max 500"));
    }

    #[test]
    fn test_rejection_log_includes_upload_size() {
        let e = InputError::FileTooLarge {
            size: 204800,
            max: 102400,
        };
        assert_eq!(
            rejection_log(ChatId(5), &e),
            "Rejected 204800 byte upload from chat 5 (limit 102400)"
        );
    }

    #[test]
    fn test_state_holds_independent_locks() {
        let state = BotState::new(Config::default()).unwrap();
        let _guard = state.locks.try_acquire(ChatId(1)).unwrap();
        assert!(state.locks.is_running(&ChatId(1)));
        assert!(!state.locks.is_running(&ChatId(2)));
    }
}
