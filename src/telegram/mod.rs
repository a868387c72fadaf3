pub mod client;
pub mod dto;
pub mod polling;

pub use client::{Messenger, TelegramClient, TelegramError};
