//! The repository contract the core consumes. Implementations own the
//! tabular store; the core never sees column positions.

use async_trait::async_trait;
use huddle_core::Result;

use crate::model::{Schedule, UserId};

/// Durable store for schedules and per-owner id counters.
///
/// No transactional guarantees are assumed. Reads and writes may fail; a
/// failed call must leave the store's previous contents intact.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// All live schedules. Rows the store cannot decode are skipped and
    /// logged by the implementation, never returned half-parsed.
    async fn list_schedules(&self) -> Result<Vec<Schedule>>;

    /// Persist a newly created schedule. `(owner_id, local_id)` must not
    /// collide with a live row.
    async fn append_schedule(&self, schedule: &Schedule) -> Result<()>;

    /// Remove the schedule keyed by `(owner, local_id)`. Returns whether a
    /// row existed. Deletion frees the local id for cyclic reuse.
    async fn delete_schedule(&self, owner: UserId, local_id: u16) -> Result<bool>;

    /// Last id handed to `owner`, if any was ever recorded.
    async fn get_counter(&self, owner: UserId) -> Result<Option<u16>>;

    /// Record the last id handed to `owner`.
    async fn set_counter(&self, owner: UserId, value: u16) -> Result<()>;
}
