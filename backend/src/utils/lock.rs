// src/utils/lock.rs

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per key, so unrelated keys never contend.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive access to one key of a [`KeyedLocks`].
///
/// Dropping it, or dropping the `lock` future while it still waits, removes
/// the key's entry once nobody else holds or awaits it.
#[derive(Debug)]
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Unlock before counting references.
        self.held.take();
        self.locks.release_if_idle(&self.key);
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        // Declared before `acquire` so that on cancellation the pending
        // future and its reference are dropped first.
        let mut guard = KeyGuard {
            locks: self,
            key: key.to_owned(),
            held: None,
        };
        let acquire = self.locks.entry(key.to_owned()).or_default().clone().lock_owned();
        guard.held = Some(acquire.await);
        guard
    }

    /// Drops the entry for `key` if nobody holds or awaits it.
    fn release_if_idle(&self, key: &str) {
        self.locks
            .remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
