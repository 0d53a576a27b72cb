//! Progress reporting into a chat through a single status message

use crate::proxy::verifier::{ProgressSink, ProgressUpdate};
use crate::Result;
use async_trait::async_trait;
use log::warn;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tokio::sync::Mutex;

/// Sends the first update as a new message and edits it afterwards
pub struct ChatProgress {
    bot: Bot,
    chat_id: ChatId,
    status: Mutex<Option<MessageId>>,
}

impl ChatProgress {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            status: Mutex::new(None),
        }
    }

    /// Remove the status message, if one was sent
    pub async fn finish(&self) {
        if let Some(message_id) = self.status.lock().await.take() {
            if let Err(e) = self.bot.delete_message(self.chat_id, message_id).await {
                warn!("Failed to delete status message in chat {}: {}", self.chat_id, e);
            }
        }
    }
}

#[async_trait]
impl ProgressSink for ChatProgress {
    async fn report(&self, update: &ProgressUpdate) -> Result<()> {
        let text = update.to_string();
        let mut status = self.status.lock().await;

        match *status {
            Some(message_id) => {
                self.bot
                    .edit_message_text(self.chat_id, message_id, text)
                    .await?;
            }
            None => {
                let message = self.bot.send_message(self.chat_id, text).await?;
                *status = Some(message.id);
            }
        }

        Ok(())
    }
}
