use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::repo_types::{
    Attribution, LedgerStats, Profile, SourceStats, UserRecord, BREAKDOWN_LIMIT, UNKNOWN_SOURCE,
};

/// Persistent per-user reward ledger.
///
/// Every method is one atomic unit of work against the store. Calls for
/// different users never interfere; the upsert and the reward flag rely on
/// row-level atomicity of the backing store.
#[async_trait]
pub trait UserLedger: Send + Sync {
    /// Insert or refresh the user. Display fields are overwritten, attribution
    /// fields are only filled where still empty.
    async fn upsert_user(
        &self,
        profile: &Profile,
        attribution: &Attribution,
    ) -> anyhow::Result<UserRecord>;

    /// `false` when the user is unknown.
    async fn has_rewarded(&self, user_id: i64) -> anyhow::Result<bool>;

    /// Unconditional set; repeating it is harmless.
    async fn mark_rewarded(&self, user_id: i64) -> anyhow::Result<()>;

    async fn aggregate(&self) -> anyhow::Result<LedgerStats>;
}

#[derive(Clone)]
pub struct PgLedger {
    db: PgPool,
}

impl PgLedger {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserLedger for PgLedger {
    async fn upsert_user(
        &self,
        profile: &Profile,
        attribution: &Attribution,
    ) -> anyhow::Result<UserRecord> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (user_id, username, first_name, last_name,
                               source, utm_source, utm_medium, utm_campaign,
                               is_gift_given, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                username     = EXCLUDED.username,
                first_name   = EXCLUDED.first_name,
                last_name    = EXCLUDED.last_name,
                source       = COALESCE(users.source, EXCLUDED.source),
                utm_source   = COALESCE(users.utm_source, EXCLUDED.utm_source),
                utm_medium   = COALESCE(users.utm_medium, EXCLUDED.utm_medium),
                utm_campaign = COALESCE(users.utm_campaign, EXCLUDED.utm_campaign),
                updated_at   = EXCLUDED.updated_at
            RETURNING user_id, username, first_name, last_name, is_gift_given,
                      source, utm_source, utm_medium, utm_campaign, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.username)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&attribution.source)
        .bind(&attribution.utm_source)
        .bind(&attribution.utm_medium)
        .bind(&attribution.utm_campaign)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .with_context(|| format!("upsert user {}", profile.id))?;
        Ok(user)
    }

    async fn has_rewarded(&self, user_id: i64) -> anyhow::Result<bool> {
        let row = sqlx::query_scalar::<_, bool>(
            r#"SELECT is_gift_given FROM users WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("read reward flag of user {}", user_id))?;
        Ok(row.unwrap_or(false))
    }

    async fn mark_rewarded(&self, user_id: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET is_gift_given = TRUE, updated_at = $1
             WHERE user_id = $2
            "#,
        )
        .bind(OffsetDateTime::now_utc())
        .bind(user_id)
        .execute(&self.db)
        .await
        .with_context(|| format!("mark user {} rewarded", user_id))?;
        Ok(())
    }

    async fn aggregate(&self) -> anyhow::Result<LedgerStats> {
        let (total_users, rewarded_users) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*)::BIGINT,
                   COUNT(*) FILTER (WHERE is_gift_given)::BIGINT
              FROM users
            "#,
        )
        .fetch_one(&self.db)
        .await
        .context("count users")?;

        let by_source = sqlx::query_as::<_, SourceStats>(
            r#"
            SELECT COALESCE(source, $1)                         AS source,
                   COUNT(*)::BIGINT                              AS total,
                   COUNT(*) FILTER (WHERE is_gift_given)::BIGINT AS rewarded
              FROM users
             GROUP BY 1
             ORDER BY total DESC, source ASC
             LIMIT $2
            "#,
        )
        .bind(UNKNOWN_SOURCE)
        .bind(BREAKDOWN_LIMIT as i64)
        .fetch_all(&self.db)
        .await
        .context("group users by source")?;

        Ok(LedgerStats {
            total_users,
            rewarded_users,
            by_source,
        })
    }
}
