//! Per-tenant serialization of directory mutations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per tenant. Create, update, move and remove hold the
/// tenant's guard across their check-then-write sequence, so two
/// reparents in the same tenant cannot jointly introduce a cycle.
/// Different tenants never share a lock.
///
/// An entry whose only reference is the map has no holder and no waiter;
/// such entries are dropped on the next `acquire`, so the map tracks only
/// tenants with mutations in flight.
#[derive(Debug, Default)]
pub struct TenantLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl TenantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, tenant_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Clones only happen under this lock, so a count of one is final.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(tenant_id).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_tenant_waits_for_release() {
        let locks = Arc::new(TenantLocks::new());
        let tenant = Uuid::new_v4();

        let guard = locks.acquire(tenant).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(tenant).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        let second = tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("lock should be released");
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn released_tenants_are_evicted() {
        let locks = TenantLocks::new();
        let busy = Uuid::new_v4();
        let held = locks.acquire(busy).await;

        for _ in 0..10 {
            drop(locks.acquire(Uuid::new_v4()).await);
        }
        let last = locks.acquire(Uuid::new_v4()).await;

        let tenants: Vec<Uuid> = locks.inner.lock().unwrap().keys().copied().collect();
        assert_eq!(tenants.len(), 2);
        assert!(tenants.contains(&busy));

        drop(held);
        drop(last);
        let _again = locks.acquire(busy).await;
        assert_eq!(locks.inner.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn different_tenants_do_not_contend() {
        let locks = TenantLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }
}
