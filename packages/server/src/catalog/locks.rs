use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-entity async mutexes.
///
/// File operations are not guarded by the record store's transactions, so
/// two concurrent updates to the same product could race on the media tree
/// (one request deleting a file the other just treated as kept). Updates
/// and deletes take the entity's lock before touching files or rows.
///
/// Entries are never reaped; the map is bounded by catalog size.
#[derive(Default)]
pub struct KeyedLocks {
    inner: DashMap<(&'static str, i32), Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, scope: &'static str, id: i32) -> OwnedMutexGuard<()> {
        let mutex = self
            .inner
            .entry((scope, id))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}
