use anyhow::Context;
use tracing::{error, info, warn};

use super::messages::{join_keyboard, ALREADY_REWARDED, JOIN_PROMPT};
use super::verifier::{check_membership, MembershipCheck};
use crate::state::AppState;
use crate::telegram::dto::TextFormat;

/// Where one pass of the reward state machine ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardOutcome {
    /// Gate not passed; the user was (or should be) prompted to join.
    NotMember(MembershipCheck),
    AlreadyRewarded,
    Granted,
}

pub async fn verify(state: &AppState, user_id: i64) -> MembershipCheck {
    check_membership(
        state.messenger.as_ref(),
        &state.config.telegram.channel,
        user_id,
    )
    .await
}

/// Full pass for `/start` and `/gift`: verify, then grant or prompt.
pub async fn run_workflow(state: &AppState, chat_id: i64, user_id: i64) -> anyhow::Result<RewardOutcome> {
    let check = verify(state, user_id).await;
    if !check.is_verified() {
        state
            .messenger
            .send_prompt(chat_id, JOIN_PROMPT, &join_keyboard(&state.config.telegram))
            .await
            .context("send join prompt")?;
        return Ok(RewardOutcome::NotMember(check));
    }
    grant_once(state, chat_id, user_id).await
}

/// Member branch: deliver the reward unless the ledger says it was given.
///
/// The reward goes out before the flag is written, so a failed delivery
/// leaves the user eligible. Concurrent triggers for one user are queued on
/// the per-user guard; across processes a duplicate delivery is possible
/// until the first flag write commits.
pub async fn grant_once(state: &AppState, chat_id: i64, user_id: i64) -> anyhow::Result<RewardOutcome> {
    let _guard = state.locks.lock(user_id).await;

    if state.ledger.has_rewarded(user_id).await? {
        info!(user_id, "reward already granted");
        state
            .messenger
            .send_text(chat_id, ALREADY_REWARDED, TextFormat::Plain)
            .await
            .context("send already-rewarded notice")?;
        return Ok(RewardOutcome::AlreadyRewarded);
    }

    state
        .messenger
        .send_text(chat_id, &state.config.reward_text, TextFormat::Markdown)
        .await
        .context("deliver reward")?;

    if let Err(e) = state.ledger.mark_rewarded(user_id).await {
        error!(user_id, error = %e, "reward delivered but flag not persisted");
        return Err(e);
    }
    info!(user_id, "reward granted");
    Ok(RewardOutcome::Granted)
}

/// Drop the join prompt once it served its purpose. Only a prompt that is
/// already gone is expected; anything else is reported and skipped.
pub async fn remove_prompt(state: &AppState, chat_id: i64, message_id: i64) {
    match state.messenger.delete_message(chat_id, message_id).await {
        Ok(()) => {}
        Err(e) if e.is_message_gone() => {}
        Err(e) => warn!(chat_id, message_id, error = %e, "could not remove join prompt"),
    }
}
