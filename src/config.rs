use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_REWARD_TEXT: &str = "🎁 Here is your gift!\n\n\
Thanks for subscribing. Your bonus: promo code *GIFT2025* for a special offer.";

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    pub channel: String,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub telegram: TelegramConfig,
    pub admin_ids: Vec<i64>,
    pub reward_text: String,
    /// Bind address of the `/health` endpoint.
    pub http_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN is not set")?;
        if token.trim().is_empty() || token.starts_with('<') {
            anyhow::bail!("TELEGRAM_BOT_TOKEN holds a placeholder, set a real bot token");
        }
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let telegram = TelegramConfig {
            token,
            api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".into()),
            channel: std::env::var("CHANNEL_USERNAME")
                .unwrap_or_else(|_| "@your_channel_username".into()),
            poll_timeout_secs: std::env::var("POLL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };

        Ok(Self {
            database_url,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(5),
            telegram,
            admin_ids: std::env::var("ADMIN_IDS")
                .map(|v| parse_admin_ids(&v))
                .unwrap_or_default(),
            reward_text: std::env::var("REWARD_TEXT")
                .unwrap_or_else(|_| DEFAULT_REWARD_TEXT.into()),
            http_addr: http_addr(
                &std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                &std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into()),
            )?,
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

impl TelegramConfig {
    /// Public link to the channel, when it is addressed by `@username`.
    pub fn channel_url(&self) -> Option<String> {
        self.channel
            .strip_prefix('@')
            .filter(|name| !name.is_empty())
            .map(|name| format!("https://t.me/{}", name))
    }
}

fn http_addr(host: &str, port: &str) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("APP_HOST/APP_PORT do not form an address: {}:{}", host, port))
}

/// Comma separated list of numeric ids; bad entries are skipped.
pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(entry = %s, error = %e, "skipping malformed ADMIN_IDS entry");
                None
            }
        })
        .collect()
}
