use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// In-process per-user guards.
///
/// Triggers for the same user queue behind one async mutex, triggers for
/// different users never touch each other's entry. Entries are dropped once
/// nobody holds or waits on them.
#[derive(Default)]
pub struct UserLocks {
    slots: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

pub struct UserGuard<'a> {
    user_id: i64,
    owner: &'a UserLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UserLocks {
    pub async fn lock(&self, user_id: i64) -> UserGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
            slots.entry(user_id).or_default().clone()
        };
        let guard = slot.lock_owned().await;
        UserGuard {
            user_id,
            owner: self,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self.owner.slots.lock().unwrap_or_else(|p| p.into_inner());
        // map + our released guard gone: only the map holds it
        if slots
            .get(&self.user_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.user_id);
        }
    }
}
