use tracing::{error, info};

use crate::telegram::Messenger;

/// Outcome of one membership query. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipCheck {
    Verified,
    NotVerified,
    /// The authority could not be asked or gave an unusable answer.
    CheckFailed,
}

impl MembershipCheck {
    /// Fails closed: only a confirmed membership counts.
    pub fn is_verified(self) -> bool {
        matches!(self, MembershipCheck::Verified)
    }
}

pub async fn check_membership(messenger: &dyn Messenger, channel: &str, user_id: i64) -> MembershipCheck {
    match messenger.chat_member_status(channel, user_id).await {
        Ok(status) => {
            info!(user_id, ?status, "channel membership status");
            if status.is_member() {
                MembershipCheck::Verified
            } else {
                MembershipCheck::NotVerified
            }
        }
        Err(e) => {
            error!(user_id, error = %e, "membership check failed");
            MembershipCheck::CheckFailed
        }
    }
}
