//! Telegram adapter: formatting, keyboards, callback decoding, and the bot dispatcher.
//!
//! Handlers are thin: they decode the update, resolve the acting user, and
//! hand off to the store, the flows, or the moderation service. Every
//! privileged action passes the Telegram user id through explicitly.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{BotCommandScope, InlineKeyboardMarkup, ParseMode, Recipient};
use tracing::{debug, error, info, warn};

use crate::admin::{Gate, Moderation, Recorder};
use crate::config::Config;
use crate::db::{Store, TelegramProfile, User};
use crate::flows::FlowStore;

mod admin_panel;
pub mod callbacks;
pub mod commands;
mod handlers;
pub mod keyboards;
pub mod ui;

/// Shown when a handler fails on a storage or network error.
const GENERIC_FAILURE: &str = "\u{26A0}\u{FE0F} Something went wrong. Please try again.";

// ---------------------------------------------------------------------------
// Shared state for handler injection
// ---------------------------------------------------------------------------

/// Shared dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
pub struct SharedState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Marketplace storage.
    pub store: Store,
    /// Admin authorization.
    pub gate: Gate,
    /// Privileged operations.
    pub moderation: Moderation,
    /// Per-chat conversation state.
    pub flows: FlowStore,
}

impl SharedState {
    /// Wire the gate, recorder, and moderation service over one store.
    pub fn new(config: Config, store: Store) -> Self {
        let gate = Gate::new(config.allow_list(), store.clone());
        let recorder = Recorder::new(store.clone());
        let moderation = Moderation::new(
            store.clone(),
            gate.clone(),
            recorder,
            config.admin.roles.clone(),
            config.limits.admin_page_size,
        );
        Self {
            config: Arc::new(config),
            store,
            gate,
            moderation,
            flows: FlowStore::new(),
        }
    }
}

/// Per-update context: who is acting, where to reply.
pub(crate) struct Ctx<'a> {
    pub(crate) bot: &'a Bot,
    pub(crate) state: &'a SharedState,
    pub(crate) chat: ChatId,
    /// Telegram user id of the actor.
    pub(crate) actor_id: i64,
    /// The actor's marketplace row.
    pub(crate) user: User,
}

impl Ctx<'_> {
    /// Send an HTML message to the current chat.
    pub(crate) async fn send(
        &self,
        text: impl Into<String>,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> anyhow::Result<()> {
        send_html(self.bot, self.chat, text.into(), keyboard).await?;
        Ok(())
    }

    /// Key for flow state. Messages and button presses from one user share it.
    pub(crate) fn chat_key(&self) -> i64 {
        self.actor_id
    }
}

async fn send_html(
    bot: &Bot,
    chat: ChatId,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    let mut req = bot.send_message(chat, text).parse_mode(ParseMode::Html);
    if let Some(keyboard) = keyboard {
        req = req.reply_markup(keyboard);
    }
    req.await?;
    Ok(())
}

/// Best-effort notice to another user's private chat. Failures are logged.
pub(crate) async fn notify(bot: &Bot, telegram_id: i64, text: String) {
    if let Err(e) = send_html(bot, ChatId(telegram_id), text, None).await {
        warn!(telegram_id, error = %e, "failed to deliver notification");
    }
}

fn actor_id_of(user: &teloxide::types::User) -> i64 {
    // teloxide uses u64 for user IDs; the store uses i64.
    i64::try_from(user.id.0).unwrap_or(0)
}

fn profile_of(user: &teloxide::types::User) -> TelegramProfile {
    TelegramProfile {
        telegram_id: actor_id_of(user),
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|s| !s.is_empty()),
        last_name: user.last_name.clone(),
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the marketplace bot.
///
/// Registers the command menus, then dispatches messages and callback
/// queries until the bot is stopped (Ctrl+C).
pub async fn run_bot(bot_token: &str, shared: SharedState) -> anyhow::Result<()> {
    let bot = Bot::new(bot_token);

    register_commands(&bot, &shared).await;

    // Build dptree handler schema
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    info!(
        admins = shared.gate.allow_list().len(),
        "telegram dispatcher starting"
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("telegram dispatcher stopped");
    Ok(())
}

/// Register the user menu globally and the admin menu in each admin's chat.
async fn register_commands(bot: &Bot, shared: &SharedState) {
    if let Err(e) = bot.set_my_commands(commands::user_commands()).await {
        warn!(error = %e, "failed to register user commands");
    }
    for admin_id in shared.gate.allow_list() {
        let result = bot
            .set_my_commands(commands::admin_commands())
            .scope(BotCommandScope::Chat {
                chat_id: Recipient::Id(ChatId(*admin_id)),
            })
            .await;
        if let Err(e) = result {
            warn!(admin_id, error = %e, "failed to register admin commands");
        }
    }
}

// ---------------------------------------------------------------------------
// Update endpoints
// ---------------------------------------------------------------------------

/// Handle an incoming Telegram message.
async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let actor_id = actor_id_of(from);
    debug!(actor_id, chat_id = msg.chat.id.0, "telegram message received");

    if let Err(e) = handlers::on_message(&bot, &msg, from, &state).await {
        error!(actor_id, error = %e, "message handler failed");
        send_html(&bot, msg.chat.id, GENERIC_FAILURE.to_owned(), None).await?;
    }
    Ok(())
}

/// Handle inline keyboard callback queries.
async fn handle_callback(bot: Bot, query: CallbackQuery, state: SharedState) -> ResponseResult<()> {
    let actor_id = actor_id_of(&query.from);
    let data = query.data.clone().unwrap_or_default();
    debug!(actor_id, data = %data, "telegram callback received");

    let answer = match handlers::on_callback(&bot, &query.from, &data, &state).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(actor_id, data = %data, error = %e, "callback handler failed");
            Some(GENERIC_FAILURE.to_owned())
        }
    };

    let mut req = bot.answer_callback_query(&query.id);
    if let Some(text) = answer {
        req = req.text(text);
    }
    req.await?;
    Ok(())
}
