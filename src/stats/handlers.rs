use anyhow::Context;
use tracing::{info, instrument};

use super::services::{format_report, STATS_DENIED};
use crate::state::AppState;
use crate::telegram::dto::{TextFormat, User};

/// `/stats`: conversion report, allow-listed admins only.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn on_stats(state: &AppState, chat_id: i64, user: &User) -> anyhow::Result<()> {
    if !state.config.is_admin(user.id) {
        info!("stats denied");
        state
            .messenger
            .send_text(chat_id, STATS_DENIED, TextFormat::Plain)
            .await
            .context("send stats denial")?;
        return Ok(());
    }

    let stats = state.ledger.aggregate().await?;
    state
        .messenger
        .send_text(chat_id, &format_report(&stats), TextFormat::Plain)
        .await
        .context("send stats report")?;
    Ok(())
}
