//! Top-level schedule operations: create, delete, query, list.
//!
//! Wires the repository, the id allocator, and the pure matching/view code
//! together. Queries either complete or fail whole; a store failure never
//! yields a partial report.

use std::sync::Arc;

use chrono::NaiveDateTime;
use huddle_core::{HuddleConfig, Result};

use crate::alloc::IdAllocator;
use crate::model::{MAX_EXTENDED_ACCESS, Schedule, ScheduleDraft, UserId, Window};
use crate::parse;
use crate::repo::ScheduleRepository;
use crate::view::{self, Report};

/// The schedule engine — the one entry point transports talk to.
pub struct ScheduleEngine<R> {
    repo: Arc<R>,
    allocator: IdAllocator<R>,
    config: HuddleConfig,
}

impl<R: ScheduleRepository> ScheduleEngine<R> {
    pub fn new(repo: Arc<R>, config: HuddleConfig) -> Self {
        Self {
            allocator: IdAllocator::new(repo.clone()),
            repo,
            config,
        }
    }

    /// Current wall-clock moment in the deployment's zone.
    pub fn local_now(&self) -> NaiveDateTime {
        self.config.local_now()
    }

    /// Validate the draft, allocate a local id, stamp it, and store it.
    ///
    /// The returned schedule carries the id the member must quote to delete
    /// it later. Field validation never reaches the store.
    pub async fn create(&self, draft: ScheduleDraft) -> Result<Schedule> {
        let message = parse::parse_message(&draft.message)?;
        let mut extended_access = draft.extended_access;
        extended_access.truncate(MAX_EXTENDED_ACCESS);

        let local_id = self.allocator.next_id(draft.owner_id).await;
        let schedule = Schedule {
            owner_id: draft.owner_id,
            local_id,
            member: draft.member,
            anchor_date: draft.anchor_date,
            time_of_day: draft.time_of_day,
            recurrence: draft.recurrence,
            message,
            project: if draft.project.trim().is_empty() {
                self.config.default_project.clone()
            } else {
                draft.project
            },
            extended_access,
            created_at: self.local_now(),
        };
        self.repo.append_schedule(&schedule).await?;
        tracing::info!(
            "schedule added: owner={} id={} {} at {}",
            schedule.owner_id,
            schedule.local_id,
            schedule.recurrence,
            schedule.time_of_day
        );
        Ok(schedule)
    }

    /// Delete by `(owner, local_id)`. Frees the id for cyclic reuse and
    /// drops the owner's cached counter.
    pub async fn delete(&self, owner: UserId, local_id: u16) -> Result<bool> {
        let deleted = self.repo.delete_schedule(owner, local_id).await?;
        if deleted {
            self.allocator.invalidate(owner).await;
            tracing::info!("schedule deleted: owner={owner} id={local_id}");
        }
        Ok(deleted)
    }

    /// Due-schedule report for a window at an explicit local moment.
    pub async fn query_at(
        &self,
        viewer: UserId,
        window: Window,
        local: NaiveDateTime,
    ) -> Result<Report> {
        let schedules = self.repo.list_schedules().await?;
        Ok(view::render(
            &schedules,
            viewer,
            window,
            local.date(),
            local.time(),
        ))
    }

    /// Due-schedule report using the configured deployment clock.
    pub async fn query(&self, viewer: UserId, window: Window) -> Result<Report> {
        self.query_at(viewer, window, self.local_now()).await
    }

    /// Everything the viewer can see, regardless of date.
    pub async fn list_all(&self, viewer: UserId) -> Result<Vec<Schedule>> {
        let schedules = self.repo.list_schedules().await?;
        Ok(view::list_visible(&schedules, viewer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClockTime, Meridiem, Recurrence};
    use crate::persistence::SqliteStore;
    use chrono::NaiveDate;
    use huddle_core::{HuddleError, ValidationError};

    fn temp_engine(name: &str) -> (ScheduleEngine<SqliteStore>, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("huddle-engine-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        let store = Arc::new(SqliteStore::open(&dir.join("test.db")).unwrap());
        (ScheduleEngine::new(store, HuddleConfig::default()), dir)
    }

    fn draft(owner: UserId, recurrence: Recurrence, message: &str) -> ScheduleDraft {
        ScheduleDraft {
            owner_id: owner,
            member: "Ana".into(),
            anchor_date: NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
            time_of_day: ClockTime::new(8, 0, Meridiem::Am).unwrap(),
            recurrence,
            message: message.into(),
            project: "General".into(),
            extended_access: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_allocates_sequential_ids_and_persists() {
        let (engine, dir) = temp_engine("create");
        let first = engine
            .create(draft(7, Recurrence::Daily, "standup"))
            .await
            .unwrap();
        let second = engine
            .create(draft(7, Recurrence::Once, "review"))
            .await
            .unwrap();
        assert_eq!(first.local_id, 1);
        assert_eq!(second.local_id, 2);

        let all = engine.list_all(7).await.unwrap();
        assert_eq!(all.len(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn empty_messages_are_rejected_before_allocation() {
        let (engine, dir) = temp_engine("reject");
        let err = engine
            .create(draft(7, Recurrence::Daily, "   "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HuddleError::Invalid(ValidationError::EmptyMessage)
        ));
        // The failed draft did not burn an id.
        let ok = engine
            .create(draft(7, Recurrence::Daily, "standup"))
            .await
            .unwrap();
        assert_eq!(ok.local_id, 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn extended_access_is_capped() {
        let (engine, dir) = temp_engine("cap");
        let mut d = draft(7, Recurrence::Daily, "standup");
        d.extended_access = vec![1, 2, 3, 4, 5, 6, 7];
        let created = engine.create(d).await.unwrap();
        assert_eq!(created.extended_access, vec![1, 2, 3, 4, 5]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn blank_projects_fall_back_to_the_configured_default() {
        let (engine, dir) = temp_engine("project");
        let mut d = draft(7, Recurrence::Daily, "standup");
        d.project = "  ".into();
        let created = engine.create(d).await.unwrap();
        assert_eq!(created.project, "General");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let (engine, dir) = temp_engine("delete");
        let created = engine
            .create(draft(7, Recurrence::Daily, "standup"))
            .await
            .unwrap();
        assert!(engine.delete(7, created.local_id).await.unwrap());
        assert!(!engine.delete(7, created.local_id).await.unwrap());
        assert!(engine.list_all(7).await.unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn query_round_trips_through_the_store() {
        let (engine, dir) = temp_engine("query");
        engine
            .create(draft(7, Recurrence::Daily, "standup"))
            .await
            .unwrap();
        engine
            .create(draft(8, Recurrence::Daily, "other owner"))
            .await
            .unwrap();

        let local = NaiveDate::from_ymd_opt(2025, 6, 21)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let report = engine.query_at(7, Window::Today, local).await.unwrap();
        match report {
            Report::Sections { sections, .. } => {
                assert_eq!(sections.len(), 1);
                assert_eq!(sections[0].entries.len(), 1);
                assert_eq!(sections[0].entries[0].message, "standup");
            }
            Report::Empty => panic!("expected the daily schedule"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn visibility_extends_to_delegates_in_queries() {
        let (engine, dir) = temp_engine("delegate");
        let mut d = draft(7, Recurrence::Daily, "shared standup");
        d.extended_access = vec![55];
        engine.create(d).await.unwrap();

        let local = NaiveDate::from_ymd_opt(2025, 6, 21)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        let delegate_view = engine.query_at(55, Window::Today, local).await.unwrap();
        assert!(matches!(delegate_view, Report::Sections { .. }));
        let stranger_view = engine.query_at(56, Window::Today, local).await.unwrap();
        assert!(matches!(stranger_view, Report::Empty));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn deleting_and_recreating_reuses_the_cycle() {
        let (engine, dir) = temp_engine("cycle");
        let first = engine
            .create(draft(7, Recurrence::Daily, "a"))
            .await
            .unwrap();
        engine.delete(7, first.local_id).await.unwrap();
        // The counter keeps advancing; freed ids return only when the cycle
        // wraps around.
        let second = engine
            .create(draft(7, Recurrence::Daily, "b"))
            .await
            .unwrap();
        assert_eq!(second.local_id, 2);
        std::fs::remove_dir_all(&dir).ok();
    }
}
