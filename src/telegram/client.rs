use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use super::dto::{
    AnswerCallbackQueryRequest, ApiResponse, ChatMember, EditMessageTextRequest,
    GetChatMemberRequest, GetUpdatesRequest, InlineKeyboardMarkup, MemberStatus, MessageRef,
    SendMessageRequest, TextFormat, Update,
};
use crate::config::TelegramConfig;

/// Errors from the Bot API transport.
#[derive(Error, Debug)]
pub enum TelegramError {
    /// Network failure, timeout or an unreadable body.
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered `ok: false`.
    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("telegram answered ok without a result for {0}")]
    MissingResult(&'static str),
}

impl TelegramError {
    /// The target message no longer exists (already deleted by the user or by us).
    pub fn is_message_gone(&self) -> bool {
        match self {
            TelegramError::Api { code, description } => {
                *code == 400
                    && (description.contains("message to delete not found")
                        || description.contains("MESSAGE_ID_INVALID"))
            }
            _ => false,
        }
    }

    /// Editing a message to the exact content it already has.
    pub fn is_not_modified(&self) -> bool {
        matches!(
            self,
            TelegramError::Api { code: 400, description } if description.contains("message is not modified")
        )
    }
}

/// Outbound side of the messaging transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError>;

    async fn send_text(&self, chat_id: i64, text: &str, format: TextFormat) -> Result<(), TelegramError>;

    async fn send_prompt(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<(), TelegramError>;

    async fn edit_prompt(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<(), TelegramError>;

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TelegramError>;

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError>;

    async fn chat_member_status(&self, channel: &str, user_id: i64) -> Result<MemberStatus, TelegramError>;
}

/// Bot API client over HTTPS.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        // long polls must outlive the server-side wait
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.token),
        })
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        // without_url keeps the bot token out of error messages and logs
        let resp = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let envelope: ApiResponse<T> = resp.json().await.map_err(reqwest::Error::without_url)?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code.unwrap_or_default(),
                description: envelope.description.unwrap_or_default(),
            });
        }
        debug!(method, "telegram call ok");
        envelope.result.ok_or(TelegramError::MissingResult(method))
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: timeout_secs,
                allowed_updates: &["message", "callback_query"],
            },
        )
        .await
    }

    async fn send_text(&self, chat_id: i64, text: &str, format: TextFormat) -> Result<(), TelegramError> {
        let parse_mode = match format {
            TextFormat::Plain => None,
            TextFormat::Markdown => Some("Markdown"),
        };
        self.call::<_, serde_json::Value>(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text,
                parse_mode,
                reply_markup: None,
            },
        )
        .await?;
        Ok(())
    }

    async fn send_prompt(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<(), TelegramError> {
        self.call::<_, serde_json::Value>(
            "sendMessage",
            &SendMessageRequest {
                chat_id,
                text,
                parse_mode: None,
                reply_markup: Some(keyboard),
            },
        )
        .await?;
        Ok(())
    }

    async fn edit_prompt(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<(), TelegramError> {
        self.call::<_, serde_json::Value>(
            "editMessageText",
            &EditMessageTextRequest {
                chat_id,
                message_id,
                text,
                reply_markup: keyboard,
            },
        )
        .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), TelegramError> {
        self.call::<_, bool>(
            "answerCallbackQuery",
            &AnswerCallbackQueryRequest {
                callback_query_id: callback_id,
            },
        )
        .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        self.call::<_, bool>("deleteMessage", &MessageRef { chat_id, message_id })
            .await?;
        Ok(())
    }

    async fn chat_member_status(&self, channel: &str, user_id: i64) -> Result<MemberStatus, TelegramError> {
        let member: ChatMember = self
            .call(
                "getChatMember",
                &GetChatMemberRequest {
                    chat_id: channel,
                    user_id,
                },
            )
            .await?;
        Ok(member.status)
    }
}
