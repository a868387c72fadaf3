use crate::config::AppConfig;
use crate::reward::UserLocks;
use crate::telegram::{Messenger, TelegramClient};
use crate::users::{PgLedger, UserLedger};
use std::sync::Arc;

/// Everything a trigger handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<dyn UserLedger>,
    pub messenger: Arc<dyn Messenger>,
    pub locks: Arc<UserLocks>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = crate::db::connect(&config).await?;
        let ledger = Arc::new(PgLedger::new(db)) as Arc<dyn UserLedger>;
        let messenger = Arc::new(TelegramClient::new(&config.telegram)?) as Arc<dyn Messenger>;

        Ok(Self::from_parts(config, ledger, messenger))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        ledger: Arc<dyn UserLedger>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            ledger,
            messenger,
            locks: Arc::new(UserLocks::default()),
        }
    }
}
