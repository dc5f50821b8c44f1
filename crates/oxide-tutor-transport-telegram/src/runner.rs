use crate::bot;
use crate::bot::handlers::Command;
use crate::config::BotSettings;
use crate::keep_alive::spawn_keep_alive;
use anyhow::{anyhow, Context, Result};
use axum::routing::get;
use oxide_tutor_core::grammar::LanguageToolClient;
use oxide_tutor_core::llm::OpenRouterClient;
use oxide_tutor_core::session::{InMemorySessionStore, SessionStore};
use oxide_tutor_runtime::RelayServices;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Me};
use teloxide::update_listeners::{webhooks, UpdateListener};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime.
///
/// Registers the webhook, serves it together with a `GET /` health route,
/// starts the keep-alive task and dispatches updates until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the webhook cannot be registered or the port cannot
/// be bound.
pub async fn run_bot(settings: Arc<BotSettings>) -> Result<()> {
    let token = settings
        .telegram
        .token()
        .ok_or_else(|| anyhow!("Telegram bot token is not configured"))?;
    let bot = Bot::new(token);

    let sessions = init_sessions(&settings);
    let services = Arc::new(RelayServices {
        sessions: sessions.clone(),
        grammar: Arc::new(LanguageToolClient::new(&settings.tutor)),
        completion: Arc::new(OpenRouterClient::new(&settings.tutor)),
    });
    if settings.tutor.has_openrouter_key() {
        info!(model = %settings.tutor.chat_model_id, "Completion client initialized.");
    } else {
        warn!("OPENROUTER_API_KEY is not set; replies will report the missing key.");
    }

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let address = SocketAddr::from(([0, 0, 0, 0], settings.telegram.port));
    let url = settings.telegram.webhook_endpoint()?;
    info!(%address, webhook = %url, "Registering webhook");

    let options = webhooks::Options::new(address, url);
    let (mut listener, stop_flag, router) = webhooks::axum_to_router(bot.clone(), options)
        .await
        .context("Failed to set up the Telegram webhook")?;
    let app = router.route("/", get(health));

    let tcp_listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    let stop_token = listener.stop_token();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp_listener, app)
            .with_graceful_shutdown(stop_flag)
            .await
        {
            error!(error = %e, "Webhook server failed");
            stop_token.stop();
        }
    });

    init_keep_alive(&settings);

    info!("Bot is running...");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![sessions, services])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}

fn init_sessions(settings: &BotSettings) -> Arc<dyn SessionStore> {
    let max_entries = settings.tutor.session_max_entries;
    info!(?max_entries, "Initializing in-memory session store");
    Arc::new(InMemorySessionStore::new(max_entries))
}

fn init_keep_alive(settings: &BotSettings) {
    if !settings.telegram.keep_alive_enabled {
        info!("Keep-alive disabled");
        return;
    }
    let Some(url) = settings.telegram.keep_alive_url() else {
        return;
    };
    let interval = Duration::from_secs(settings.telegram.keep_alive_interval_secs.max(1));
    // Detached: runs for the life of the process
    drop(spawn_keep_alive(url, interval));
}

async fn health() -> &'static str {
    "OK"
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_mode_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::filter_map(|msg: Message, me: Me| {
                        msg.text()
                            .and_then(|text| bot::handlers::parse_command(text, me.username()))
                    })
                    .endpoint(handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| msg.text().is_some())
                        .endpoint(handle_text_message),
                ),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    sessions: Arc<dyn SessionStore>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
        Command::ChooseMode => bot::handlers::choose_mode(bot, msg).await,
        Command::SetMode(args) => bot::handlers::set_mode(bot, msg, sessions, args).await,
        Command::CurrentMode => bot::handlers::current_mode(bot, msg, sessions).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_mode_callback(
    bot: Bot,
    q: CallbackQuery,
    sessions: Arc<dyn SessionStore>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_mode_callback(bot, q, sessions).await {
        error!("Mode callback handler error: {}", e);
    }
    respond(())
}

async fn handle_text_message(
    bot: Bot,
    msg: Message,
    services: Arc<RelayServices>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(bot, msg, services).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
