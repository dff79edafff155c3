//! Viewer visibility: the owner and explicitly delegated identities only.

use crate::model::{Schedule, UserId};

/// True iff `viewer` may see `schedule` — the creator, or anyone on the
/// extended-access list. Nobody else ever gains visibility implicitly.
pub fn visible(viewer: UserId, schedule: &Schedule) -> bool {
    viewer == schedule.owner_id || schedule.extended_access.contains(&viewer)
}
