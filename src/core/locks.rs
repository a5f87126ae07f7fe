use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use crate::types::ids::UserId;

type LockMap = DashMap<UserId, Arc<Mutex<()>>>;

/// One async mutex per identity. Holding the guard serializes every
/// mutating operation for that identity; other identities are unaffected.
///
/// Entries live only while someone holds or waits on them, so identities
/// that were only ever rejected leave nothing behind.
#[derive(Default)]
pub struct IdentityLocks {
    locks: Arc<LockMap>,
}

/// Exclusive hold on one identity. Dropping it releases the mutex and
/// removes the map entry when no other task references it.
pub struct IdentityGuard {
    locks: Arc<LockMap>,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        IdentityLocks::default()
    }

    pub async fn acquire(&self, user_id: &UserId) -> IdentityGuard {
        // The map shard guard must be released before awaiting
        let lock = self.locks.entry(user_id.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        IdentityGuard {
            locks: Arc::clone(&self.locks),
            user_id: user_id.clone(),
            guard: Some(guard),
        }
    }

    /// Identities currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for IdentityGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // A waiter holds its own clone, so a count of one means the map is
        // the last owner. The check and removal share the shard write lock.
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
