use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use super::dto::{Update, User};
use crate::reward::handlers as reward_handlers;
use crate::state::AppState;
use crate::stats::handlers as stats_handlers;

/// Callback payload of the "I subscribed" button.
pub const CONFIRM_CALLBACK: &str = "check_sub_again";

const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Inbound trigger extracted from a raw update.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// `/start [payload]`
    Start {
        chat_id: i64,
        user: User,
        payload: Option<String>,
    },
    /// `/gift`
    Gift { chat_id: i64, user: User },
    /// `/stats`
    Stats { chat_id: i64, user: User },
    /// Button press under the join prompt.
    Confirm {
        callback_id: String,
        chat_id: i64,
        message_id: i64,
        user: User,
    },
    /// Any other callback; only acknowledged.
    UnknownCallback { callback_id: String },
}

pub fn route(update: Update) -> Option<Trigger> {
    if let Some(cb) = update.callback_query {
        return Some(match (cb.data.as_deref(), cb.message) {
            (Some(CONFIRM_CALLBACK), Some(msg)) => Trigger::Confirm {
                callback_id: cb.id,
                chat_id: msg.chat.id,
                message_id: msg.message_id,
                user: cb.from,
            },
            _ => Trigger::UnknownCallback { callback_id: cb.id },
        });
    }

    let message = update.message?;
    let user = message.from?;
    if user.is_bot {
        return None;
    }
    let text = message.text?;
    let (command, rest) = split_command(&text)?;
    let chat_id = message.chat.id;

    match command {
        "start" => Some(Trigger::Start {
            chat_id,
            user,
            payload: rest.map(str::to_string),
        }),
        "gift" => Some(Trigger::Gift { chat_id, user }),
        "stats" => Some(Trigger::Stats { chat_id, user }),
        _ => None,
    }
}

/// `/cmd@bot arg` → (`cmd`, `arg`).
fn split_command(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.trim();
    let body = text.strip_prefix('/')?;
    let (head, rest) = match body.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, Some(rest.trim()).filter(|r| !r.is_empty())),
        None => (body, None),
    };
    let command = head.split('@').next().unwrap_or(head);
    Some((command, rest))
}

pub async fn dispatch(state: AppState, trigger: Trigger) {
    let result = match trigger {
        Trigger::Start {
            chat_id,
            user,
            payload,
        } => reward_handlers::on_start(&state, chat_id, &user, payload.as_deref()).await,
        Trigger::Gift { chat_id, user } => reward_handlers::on_gift(&state, chat_id, &user).await,
        Trigger::Stats { chat_id, user } => stats_handlers::on_stats(&state, chat_id, &user).await,
        Trigger::Confirm {
            callback_id,
            chat_id,
            message_id,
            user,
        } => {
            reward_handlers::on_confirmation(&state, &callback_id, chat_id, message_id, &user).await
        }
        Trigger::UnknownCallback { callback_id } => state
            .messenger
            .answer_callback(&callback_id)
            .await
            .map_err(Into::into),
    };
    if let Err(e) = result {
        error!(error = %format!("{:#}", e), "trigger aborted");
    }
}

/// Long-poll the Bot API and run every update on its own task.
///
/// Once `shutdown` resolves no new updates are fetched; handlers already
/// running are awaited before returning. Updates of an interrupted poll are
/// never acknowledged, so Telegram hands them out again on the next start.
pub async fn run(state: AppState, shutdown: impl Future<Output = ()>) {
    let timeout = state.config.telegram.poll_timeout_secs;
    let mut offset = 0_i64;
    let mut handlers = JoinSet::new();
    tokio::pin!(shutdown);
    info!(channel = %state.config.telegram.channel, "polling started");

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            polled = state.messenger.get_updates(offset, timeout) => polled,
        };

        while let Some(done) = handlers.try_join_next() {
            log_join(done);
        }

        let updates = match polled {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "getUpdates failed, retrying");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            match route(update) {
                Some(trigger) => {
                    handlers.spawn(dispatch(state.clone(), trigger));
                }
                None => debug!(update_id, "update ignored"),
            }
        }
    }

    info!(in_flight = handlers.len(), "polling stopped, waiting for running triggers");
    while let Some(done) = handlers.join_next().await {
        log_join(done);
    }
    info!("all triggers finished");
}

fn log_join(done: Result<(), JoinError>) {
    if let Err(e) = done {
        error!(error = %e, "trigger task panicked");
    }
}
