//! Per-requester run lock

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// Tracks which requesters currently have a verification run in flight
pub struct RunLocks<K> {
    active: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash + Clone> RunLocks<K> {
    pub fn new() -> Self {
        Self {
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Take the lock for `key`, or `None` if a run is already in flight
    pub fn try_acquire(&self, key: K) -> Option<RunGuard<K>> {
        if !lock_set(&self.active).insert(key.clone()) {
            return None;
        }
        Some(RunGuard {
            key,
            active: Arc::clone(&self.active),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self, key: &K) -> bool {
        lock_set(&self.active).contains(key)
    }
}

impl<K: Eq + Hash + Clone> Default for RunLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for RunLocks<K> {
    fn clone(&self) -> Self {
        Self {
            active: Arc::clone(&self.active),
        }
    }
}

/// Held for the lifetime of a run; dropping it releases the requester
pub struct RunGuard<K: Eq + Hash> {
    key: K,
    active: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> RunGuard<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: Eq + Hash> Drop for RunGuard<K> {
    fn drop(&mut self) {
        lock_set(&self.active).remove(&self.key);
    }
}

// A panic while holding the set cannot leave it half-updated, so poisoning is ignored
fn lock_set<K>(set: &Mutex<HashSet<K>>) -> MutexGuard<'_, HashSet<K>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_rejected() {
        let locks = RunLocks::new();
        let guard = locks.try_acquire(42i64).unwrap();
        assert_eq!(*guard.key(), 42);
        assert!(locks.is_running(&42));
        assert!(locks.try_acquire(42).is_none());
    }

    #[test]
    fn test_keys_are_independent() {
        let locks = RunLocks::new();
        let _a = locks.try_acquire("chat-a").unwrap();
        let _b = locks.try_acquire("chat-b").unwrap();
        assert!(locks.is_running(&"chat-a"));
        assert!(locks.is_running(&"chat-b"));
    }

    #[test]
    fn test_drop_releases() {
        let locks = RunLocks::new();
        let guard = locks.try_acquire(7u32).unwrap();
        drop(guard);
        assert!(!locks.is_running(&7));
        assert!(locks.try_acquire(7).is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let locks = RunLocks::new();
        let other = locks.clone();
        let _guard = locks.try_acquire(1u8).unwrap();
        assert!(other.try_acquire(1).is_none());
    }

    #[tokio::test]
    async fn test_released_when_task_panics() {
        let locks = RunLocks::new();
        let guard = locks.try_acquire(9u64).unwrap();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("run failed");
        });
        assert!(handle.await.is_err());

        assert!(!locks.is_running(&9));
    }
}
