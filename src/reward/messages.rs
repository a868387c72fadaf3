use crate::config::TelegramConfig;
use crate::telegram::dto::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::telegram::polling::CONFIRM_CALLBACK;

pub const JOIN_PROMPT: &str = "To get the gift you need to be subscribed to our channel.\n\n\
1️⃣ Subscribe to the channel\n\
2️⃣ Tap «✅ I subscribed»";

pub const STILL_NOT_MEMBER: &str = "Looks like the subscription is not there yet 🤍\n\n\
Check that you are subscribed to the channel and tap the button again.";

pub const ALREADY_REWARDED: &str = "You have already received your gift 🎁\n\n\
If you need it again, just write to us and we will help.";

/// Join prompt keyboard: a link to the channel (when it has a public
/// username) and the re-check button.
pub fn join_keyboard(telegram: &TelegramConfig) -> InlineKeyboardMarkup {
    let mut rows = Vec::with_capacity(2);
    if let Some(url) = telegram.channel_url() {
        rows.push(vec![InlineKeyboardButton::link("Open the channel", url)]);
    }
    rows.push(vec![InlineKeyboardButton::callback(
        "✅ I subscribed",
        CONFIRM_CALLBACK,
    )]);
    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}
