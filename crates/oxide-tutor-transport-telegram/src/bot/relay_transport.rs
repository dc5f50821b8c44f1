//! Telegram adapter for the message relay.

use crate::bot::views::main_menu_keyboard;
use anyhow::Result;
use async_trait::async_trait;
use oxide_tutor_core::utils::split_long_message;
use oxide_tutor_runtime::RelayTransport;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Maximum message length for Telegram with safety margin.
/// Telegram's official limit is 4096 characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Sends relay output into a single chat.
pub struct TelegramRelayTransport {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramRelayTransport {
    /// Create a transport bound to `chat_id`.
    #[must_use]
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl RelayTransport for TelegramRelayTransport {
    #[allow(deprecated)]
    async fn send_grammar_report(&self, report: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id, report)
            .parse_mode(ParseMode::Markdown)
            .await
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))?;
        Ok(())
    }

    async fn send_notice(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn send_reply(&self, text: &str) -> Result<()> {
        let parts = split_long_message(text, TELEGRAM_MESSAGE_LIMIT);
        let last = parts.len().saturating_sub(1);
        for (index, part) in parts.into_iter().enumerate() {
            let request = self.bot.send_message(self.chat_id, part);
            if index == last {
                request.reply_markup(main_menu_keyboard()).await?;
            } else {
                request.await?;
            }
        }
        Ok(())
    }
}
