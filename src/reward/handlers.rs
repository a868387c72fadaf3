use tracing::{info, instrument, warn};

use super::messages::{join_keyboard, STILL_NOT_MEMBER};
use super::services::{grant_once, remove_prompt, run_workflow, verify, RewardOutcome};
use crate::state::AppState;
use crate::telegram::dto::User;
use crate::users::{parse_payload, Attribution, Profile};

impl From<&User> for Profile {
    fn from(u: &User) -> Self {
        Profile {
            id: u.id,
            username: u.username.clone(),
            first_name: Some(u.first_name.clone()),
            last_name: u.last_name.clone(),
        }
    }
}

/// `/start [payload]`: first contact, the only trigger that carries attribution.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn on_start(
    state: &AppState,
    chat_id: i64,
    user: &User,
    payload: Option<&str>,
) -> anyhow::Result<()> {
    let attribution = parse_payload(payload);
    let record = state
        .ledger
        .upsert_user(&Profile::from(user), &attribution)
        .await?;
    info!(source = ?record.source, "contact recorded");

    let outcome = run_workflow(state, chat_id, user.id).await?;
    info!(?outcome, "start handled");
    Ok(())
}

/// `/gift`: explicit reward request.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn on_gift(state: &AppState, chat_id: i64, user: &User) -> anyhow::Result<()> {
    state
        .ledger
        .upsert_user(&Profile::from(user), &Attribution::default())
        .await?;

    let outcome = run_workflow(state, chat_id, user.id).await?;
    info!(?outcome, "gift request handled");
    Ok(())
}

/// "I subscribed" button under the join prompt.
#[instrument(skip(state, user, callback_id), fields(user_id = user.id))]
pub async fn on_confirmation(
    state: &AppState,
    callback_id: &str,
    chat_id: i64,
    message_id: i64,
    user: &User,
) -> anyhow::Result<()> {
    // stops the client-side spinner; nothing depends on it
    if let Err(e) = state.messenger.answer_callback(callback_id).await {
        warn!(error = %e, "answerCallbackQuery failed");
    }

    state
        .ledger
        .upsert_user(&Profile::from(user), &Attribution::default())
        .await?;

    let check = verify(state, user.id).await;
    if !check.is_verified() {
        let keyboard = join_keyboard(&state.config.telegram);
        match state
            .messenger
            .edit_prompt(chat_id, message_id, STILL_NOT_MEMBER, &keyboard)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_modified() => {}
            Err(e) => return Err(anyhow::Error::new(e).context("update join prompt")),
        }
        info!(outcome = ?RewardOutcome::NotMember(check), "confirmation handled");
        return Ok(());
    }

    remove_prompt(state, chat_id, message_id).await;
    let outcome = grant_once(state, chat_id, user.id).await?;
    info!(?outcome, "confirmation handled");
    Ok(())
}
