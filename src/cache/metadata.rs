use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::error::AppResult;
use crate::models::{ItemMetadata, MovieId};

type Slot = Arc<OnceCell<ItemMetadata>>;

/// Process-wide, append-only cache of movie metadata keyed by catalog id
///
/// Entries are inserted at most once per id and never mutated or evicted.
/// Each id owns a slot that is initialised by the first successful fetch; callers
/// arriving while that fetch is running wait on it instead of issuing their own.
/// A slot whose fetch failed is released again, so unknown ids leave nothing behind.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone, Default)]
pub struct MetadataCache {
    slots: Arc<Mutex<HashMap<MovieId, Slot>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached metadata for `id`, fetching it with `fetch` if absent
    pub async fn get_or_fetch<F, Fut>(&self, id: MovieId, fetch: F) -> AppResult<ItemMetadata>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<ItemMetadata>>,
    {
        let slot = self.slot(id);

        if let Some(hit) = slot.get() {
            tracing::debug!(movie_id = %id, "Metadata cache hit");
            return Ok(hit.clone());
        }

        match slot.get_or_try_init(fetch).await {
            Ok(metadata) => Ok(metadata.clone()),
            Err(e) => {
                self.release(id, &slot);
                Err(e)
            }
        }
    }

    /// Returns the cached metadata for `id` without fetching
    pub fn get(&self, id: MovieId) -> Option<ItemMetadata> {
        self.lock().get(&id).and_then(|slot| slot.get().cloned())
    }

    /// Number of populated entries
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: MovieId) -> Slot {
        self.lock().entry(id).or_default().clone()
    }

    /// Drops the slot for `id` if it is still the empty one this caller used.
    /// A concurrent caller may already have filled it or replaced it.
    fn release(&self, id: MovieId, slot: &Slot) {
        let mut slots = self.lock();
        let unused = slots
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if unused {
            slots.remove(&id);
        }
    }

    // No code path panics while holding the lock; recover the map if one ever does.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MovieId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
