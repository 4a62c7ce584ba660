//! Per-deployment mutual exclusion
//!
//! Runs for the same deployment name share a source file, an image tag and
//! a job name. They are serialized here; runs for different names proceed
//! concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of one async lock per deployment name
#[derive(Debug, Clone, Default)]
pub struct DeploymentLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl DeploymentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other run holds `deployment_name`, then holds it
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn acquire(&self, deployment_name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Entries nobody else references are idle; drop them.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(deployment_name.to_string())
                .or_default()
                .clone()
        };

        if lock.try_lock().is_err() {
            debug!("Waiting for in-flight run of deployment {}", deployment_name);
        }
        lock.lock_owned().await
    }

    /// Number of deployment names currently tracked
    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_name_is_exclusive() {
        let locks = DeploymentLocks::new();
        let guard = locks.acquire("hello").await;

        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.acquire("hello")).await;
        assert!(waiting.is_err(), "second acquire should block");

        drop(guard);
        let reacquired =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("hello")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_names_do_not_block() {
        let locks = DeploymentLocks::new();
        let _a = locks.acquire("alpha").await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("beta")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = DeploymentLocks::new();
        drop(locks.acquire("alpha").await);
        drop(locks.acquire("beta").await);
        let _gamma = locks.acquire("gamma").await;
        assert_eq!(locks.tracked(), 1);
    }
}
