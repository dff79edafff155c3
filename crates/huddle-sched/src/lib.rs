//! # Huddle Scheduler
//!
//! Recurrence resolution and identifier allocation for shared-workspace
//! reminders. Five recurrence classes, each with its own idea of which
//! anchor-date fields matter, resolved against "today", "tomorrow", or a
//! Monday-start week.
//!
//! ## Architecture
//! ```text
//! query (viewer, window, reference date)
//!   └── view::render
//!         ├── access::visible       — owner + delegated viewers only
//!         ├── matcher::matches      — Once/Daily/Weekly/Monthly/Yearly
//!         ├── matcher::suppressed_as_past_due — elapsed one-shots drop out
//!         └── group by class → sort by time → passed flags → Report
//!
//! create (draft)
//!   └── engine::create
//!         ├── parse::*              — typed validation, typed rejections
//!         ├── IdAllocator::next_id  — cyclic 1..=500, cache + durable counter
//!         └── ScheduleRepository::append_schedule
//! ```
//!
//! Matching and rendering are pure; the only shared mutable state is the id
//! cache and the durable counter, both scoped per owner.

pub mod access;
pub mod alloc;
pub mod engine;
pub mod matcher;
pub mod model;
pub mod parse;
pub mod persistence;
pub mod repo;
pub mod view;

pub use alloc::IdAllocator;
pub use engine::ScheduleEngine;
pub use model::{
    ClockTime, LOCAL_ID_SPAN, MAX_EXTENDED_ACCESS, Meridiem, Recurrence, Schedule, ScheduleDraft,
    UserId, Window,
};
pub use persistence::SqliteStore;
pub use repo::ScheduleRepository;
pub use view::{Entry, Report, Section};
