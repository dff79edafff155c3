//! Cyclic per-owner id allocation backed by a cache and a durable counter.
//!
//! `next = (last % LOCAL_ID_SPAN) + 1`, starting from 1 for an owner the
//! store has never seen. The durable counter is written before the id is
//! reported to the caller, and the cache entry is written only after that
//! write is confirmed. A crash after persisting but before the caller records
//! the schedule wastes the id; that loss is accepted.
//!
//! Concurrent calls for one owner serialize on a per-owner slot, so two
//! cold-cache callers can no longer read the same durable value and both
//! hand out the same id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::model::{LOCAL_ID_SPAN, UserId};
use crate::repo::ScheduleRepository;

fn next_in_cycle(last: u16) -> u16 {
    (last % LOCAL_ID_SPAN) + 1
}

/// Hands out the next local id for an owner.
pub struct IdAllocator<R> {
    repo: Arc<R>,
    slots: Mutex<HashMap<UserId, Arc<Mutex<Option<u16>>>>>,
}

impl<R: ScheduleRepository> IdAllocator<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            slots: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, owner: UserId) -> Arc<Mutex<Option<u16>>> {
        self.slots.lock().await.entry(owner).or_default().clone()
    }

    /// Next id in `[1, LOCAL_ID_SPAN]` for `owner`.
    ///
    /// Never fails: with the store unreachable and no cached counter this
    /// falls back to 1 and logs, so scheduling stays best-effort. Identical
    /// ids across different owners are expected; every lookup downstream is
    /// keyed by `(owner_id, local_id)`.
    pub async fn next_id(&self, owner: UserId) -> u16 {
        let slot = self.slot(owner).await;
        let mut cached = slot.lock().await;

        let candidate = match *cached {
            Some(last) => next_in_cycle(last),
            None => match self.repo.get_counter(owner).await {
                Ok(Some(last)) => next_in_cycle(last),
                Ok(None) => 1,
                Err(e) => {
                    tracing::error!("id counter read failed for owner {owner}: {e}; issuing 1");
                    return 1;
                }
            },
        };

        match self.repo.set_counter(owner, candidate).await {
            Ok(()) => *cached = Some(candidate),
            // The candidate still goes out; the cache is not advanced past
            // the last confirmed write, so allocation re-converges on the
            // durable counter once the store is back.
            Err(e) => tracing::error!("id counter write failed for owner {owner}: {e}"),
        }
        candidate
    }

    /// Drop the cached counter for `owner`. Called when a schedule is
    /// deleted; the durable counter stays authoritative.
    pub async fn invalidate(&self, owner: UserId) {
        if let Some(slot) = self.slots.lock().await.get(&owner) {
            *slot.lock().await = None;
        }
    }
}
