use crate::bot::relay_transport::TelegramRelayTransport;
use crate::bot::views::{main_menu_keyboard, mode_keyboard, DefaultTutorView, TutorView};
use anyhow::Result;
use oxide_tutor_core::modes::{
    parse_mode_callback, parse_setmode_argument, CurrentMode, SetModeArgument,
};
use oxide_tutor_core::session::{ChatKey, SessionStore};
use oxide_tutor_runtime::{relay_message, RelayServices};
use std::sync::Arc;
use teloxide::{
    payloads::SendMessage,
    prelude::*,
    requests::JsonRequest,
    types::{CallbackQuery, ParseMode},
    utils::command::BotCommands,
};
use tracing::{debug, info};

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Session key of the chat a message arrived in.
#[must_use]
pub const fn chat_key(chat_id: ChatId) -> ChatKey {
    chat_id.0
}

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Greet the user and show the main keyboard
    #[command(description = "Restart the bot.")]
    Start,
    /// Show the help text
    #[command(description = "Show help.")]
    Help,
    /// Offer the inline mode keyboard
    #[command(description = "Choose a conversation mode.")]
    ChooseMode,
    /// Select a mode by name; the argument is everything after the command
    #[command(description = "Set a mode by name.")]
    SetMode(String),
    /// Report the active mode
    #[command(description = "Show the current mode.")]
    CurrentMode,
}

/// Parses a command addressed to `bot_name`.
///
/// Any whitespace may separate the command from its argument, so
/// `/setmode\tgrammar` and `/setmode\ngrammar` read like `/setmode grammar`.
#[must_use]
pub fn parse_command(text: &str, bot_name: &str) -> Option<Command> {
    let normalized = match text.split_once(char::is_whitespace) {
        Some((head, rest)) if !rest.trim().is_empty() => format!("{head} {}", rest.trim_start()),
        Some((head, _)) => head.to_string(),
        None => text.to_string(),
    };
    Command::parse(&normalized, bot_name).ok()
}

/// Applies a `/setmode` argument to the chat's session and returns the reply.
///
/// The store is only written for a valid mode.
pub async fn apply_setmode(sessions: &dyn SessionStore, chat: ChatKey, args: &str) -> String {
    match parse_setmode_argument(args) {
        SetModeArgument::Missing => DefaultTutorView::missing_mode_argument().to_string(),
        SetModeArgument::Unknown(name) => {
            debug!(chat_id = chat, mode = %name, "Rejected unknown mode");
            DefaultTutorView::unknown_mode().to_string()
        }
        SetModeArgument::Valid(mode) => {
            sessions.set(chat, mode.prompt().to_string()).await;
            info!(chat_id = chat, %mode, "Mode selected");
            DefaultTutorView::mode_set(mode)
        }
    }
}

/// Applies inline button data to the chat's session.
///
/// Returns the confirmation to send, or `None` for payloads that are not a
/// known mode; those leave the store untouched.
pub async fn apply_mode_callback(
    sessions: &dyn SessionStore,
    chat: ChatKey,
    data: &str,
) -> Option<String> {
    let mode = parse_mode_callback(data)?;
    sessions.set(chat, mode.prompt().to_string()).await;
    info!(chat_id = chat, %mode, "Mode selected from keyboard");
    Some(DefaultTutorView::mode_set(mode))
}

/// Builds the `/currentmode` reply for a chat.
pub async fn current_mode_reply(sessions: &dyn SessionStore, chat: ChatKey) -> String {
    let stored = sessions.get_raw(chat).await;
    DefaultTutorView::current_mode(CurrentMode::resolve(stored.as_deref()))
}

/// Builds the `/currentmode` reply, main keyboard attached.
pub async fn current_mode_message(
    bot: &Bot,
    sessions: &dyn SessionStore,
    chat_id: ChatId,
) -> JsonRequest<SendMessage> {
    let reply = current_mode_reply(sessions, chat_key(chat_id)).await;
    bot.send_message(chat_id, reply).reply_markup(main_menu_keyboard())
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    info!(
        chat_id = msg.chat.id.0,
        user = %get_user_name(&msg),
        "User initiated /start command."
    );

    bot.send_message(msg.chat.id, DefaultTutorView::greeting())
        .reply_markup(main_menu_keyboard())
        .await?;
    Ok(())
}

/// Help handler
///
/// # Errors
///
/// Returns an error if the help message cannot be sent.
#[allow(deprecated)]
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, DefaultTutorView::help_text())
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

/// Sends the inline mode keyboard.
///
/// # Errors
///
/// Returns an error if the message cannot be sent.
pub async fn choose_mode(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, DefaultTutorView::choose_mode_prompt())
        .reply_markup(mode_keyboard())
        .await?;
    Ok(())
}

/// `/setmode <name>` handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn set_mode(
    bot: Bot,
    msg: Message,
    sessions: Arc<dyn SessionStore>,
    args: String,
) -> Result<()> {
    let reply = apply_setmode(sessions.as_ref(), chat_key(msg.chat.id), &args).await;
    bot.send_message(msg.chat.id, reply)
        .reply_markup(main_menu_keyboard())
        .await?;
    Ok(())
}

/// `/currentmode` handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn current_mode(bot: Bot, msg: Message, sessions: Arc<dyn SessionStore>) -> Result<()> {
    let request = current_mode_message(&bot, sessions.as_ref(), msg.chat.id).await;
    request.await?;
    Ok(())
}

/// Inline mode keyboard callback handler.
///
/// The query is always acknowledged, even when the payload is ignored.
///
/// # Errors
///
/// Returns an error if the confirmation cannot be sent.
pub async fn handle_mode_callback(
    bot: Bot,
    q: CallbackQuery,
    sessions: Arc<dyn SessionStore>,
) -> Result<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(chat_id) = q.message.as_ref().map(|msg| msg.chat().id) else {
        debug!("Callback without a message, ignoring");
        return Ok(());
    };

    match apply_mode_callback(sessions.as_ref(), chat_key(chat_id), data).await {
        Some(reply) => {
            bot.send_message(chat_id, reply)
                .reply_markup(main_menu_keyboard())
                .await?;
        }
        None => debug!(chat_id = chat_id.0, data, "Ignoring unknown callback data"),
    }
    Ok(())
}

/// Freeform text handler: grammar report, notice, completion reply.
///
/// # Errors
///
/// Returns an error if the final reply cannot be sent.
pub async fn handle_text(bot: Bot, msg: Message, services: Arc<RelayServices>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    info!(
        chat_id = msg.chat.id.0,
        user = %get_user_name(&msg),
        chars = text.chars().count(),
        "Relaying message"
    );

    let transport = TelegramRelayTransport::new(bot.clone(), msg.chat.id);
    relay_message(&services, &transport, chat_key(msg.chat.id), text).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_tutor_core::modes::Mode;
    use oxide_tutor_core::session::InMemorySessionStore;
    use teloxide::requests::HasPayload;
    use teloxide::types::ReplyMarkup;

    #[test]
    fn setmode_takes_the_whole_argument() {
        assert_eq!(
            Command::parse("/setmode Examiner", "tutor_bot").ok(),
            Some(Command::SetMode("Examiner".to_string()))
        );
        assert_eq!(
            Command::parse("/setmode", "tutor_bot").ok(),
            Some(Command::SetMode(String::new()))
        );
        assert_eq!(
            Command::parse("/choosemode", "tutor_bot").ok(),
            Some(Command::ChooseMode)
        );
        assert_eq!(
            Command::parse("/currentmode@tutor_bot", "tutor_bot").ok(),
            Some(Command::CurrentMode)
        );
        assert!(Command::parse("hello there", "tutor_bot").is_err());
    }

    #[test]
    fn any_whitespace_separates_the_argument() {
        let spellings = [
            "/setmode grammar",
            "/setmode\tgrammar",
            "/setmode\ngrammar",
            "/setmode \t grammar",
        ];
        for text in spellings {
            assert_eq!(
                parse_command(text, "tutor_bot"),
                Some(Command::SetMode("grammar".to_string())),
                "{text:?}"
            );
        }
        assert_eq!(
            parse_command("/setmode\n", "tutor_bot"),
            Some(Command::SetMode(String::new()))
        );
        assert_eq!(
            parse_command("/currentmode@tutor_bot", "tutor_bot"),
            Some(Command::CurrentMode)
        );
        assert_eq!(parse_command("I has a apple", "tutor_bot"), None);
    }

    #[tokio::test]
    async fn current_mode_reply_carries_main_keyboard() {
        let store = InMemorySessionStore::default();
        store.set(7, Mode::Companion.prompt().to_string()).await;
        let bot = Bot::new("0:test-token");

        let request = current_mode_message(&bot, &store, ChatId(7)).await;
        let payload = request.payload_ref();

        assert_eq!(payload.text, "ℹ️ Current mode: companion");
        assert_eq!(
            payload.reply_markup,
            Some(ReplyMarkup::Keyboard(main_menu_keyboard()))
        );
    }
}
