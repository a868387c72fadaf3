use sqlx::FromRow;
use time::OffsetDateTime;

/// Groups without a recorded source are reported under this name.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// How many source groups the breakdown keeps.
pub const BREAKDOWN_LIMIT: usize = 10;

/// First-touch attribution. Every field is set once and never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribution {
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

/// Display fields refreshed on every contact (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User row in the reward ledger.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    #[sqlx(rename = "user_id")]
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sqlx(rename = "is_gift_given")]
    pub reward_granted: bool,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One row of the per-source breakdown.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SourceStats {
    pub source: String,
    pub total: i64,
    pub rewarded: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub total_users: i64,
    pub rewarded_users: i64,
    pub by_source: Vec<SourceStats>,
}
