//! SQLite-backed schedule store — survives restarts, supports concurrent
//! readers through a shared handle.
//!
//! Anchors travel as `MM/DD/YYYY` text (with a `YYYY-MM-DD` fallback on
//! read) and the extended-access list as a JSON array column. Rows that no
//! longer decode are skipped and logged, never returned half-parsed and
//! never fatal to the rest of the batch.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use huddle_core::{HuddleError, Result};
use rusqlite::Connection;

use crate::model::{LOCAL_ID_SPAN, Recurrence, Schedule, UserId, format_date};
use crate::parse;
use crate::repo::ScheduleRepository;

/// SQLite implementation of [`ScheduleRepository`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// One row as stored, before decoding into a typed [`Schedule`].
struct RawRow {
    owner_id: i64,
    local_id: i64,
    member: String,
    anchor_date: String,
    time_of_day: String,
    recurrence: String,
    message: String,
    project: String,
    extended_access: String,
    created_at: String,
}

impl SqliteStore {
    /// Open or create the schedule database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn =
            Connection::open(path).map_err(|e| HuddleError::Store(format!("DB open: {e}")))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Run migrations to create tables.
    fn migrate(&self) -> Result<()> {
        self.lock()?
            .execute_batch(
                "
            -- Live schedules; a row disappears only on explicit deletion
            CREATE TABLE IF NOT EXISTS schedules (
                owner_id INTEGER NOT NULL,
                local_id INTEGER NOT NULL,
                member_name TEXT NOT NULL DEFAULT '',
                anchor_date TEXT NOT NULL,       -- MM/DD/YYYY
                time_of_day TEXT NOT NULL,       -- H:MM AM/PM
                recurrence TEXT NOT NULL,        -- 'Once'..'Yearly'
                message TEXT NOT NULL,
                project TEXT NOT NULL DEFAULT 'General',
                extended_access TEXT NOT NULL DEFAULT '[]',  -- JSON array of ids
                created_at TEXT NOT NULL,
                PRIMARY KEY (owner_id, local_id)
            );

            -- Last id handed to each owner; drives cyclic allocation
            CREATE TABLE IF NOT EXISTS id_counters (
                owner_id INTEGER PRIMARY KEY,
                last_id INTEGER NOT NULL
            );
         ",
            )
            .map_err(|e| HuddleError::Store(format!("Migration: {e}")))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| HuddleError::Store(e.to_string()))
    }
}

/// `MM/DD/YYYY`, with the ISO form accepted for rows written by hand.
fn parse_stored_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Decode one stored row; `None` (with a warning) for anything that no
/// longer parses.
fn decode_row(raw: RawRow) -> Option<Schedule> {
    let key = (raw.owner_id, raw.local_id);

    let Some(anchor_date) = parse_stored_date(&raw.anchor_date) else {
        tracing::warn!("skipping schedule {key:?}: bad anchor date '{}'", raw.anchor_date);
        return None;
    };
    let Ok(time_of_day) = parse::parse_time(&raw.time_of_day) else {
        tracing::warn!("skipping schedule {key:?}: bad time '{}'", raw.time_of_day);
        return None;
    };
    let Some(recurrence) = Recurrence::from_label(&raw.recurrence) else {
        tracing::warn!("skipping schedule {key:?}: bad recurrence '{}'", raw.recurrence);
        return None;
    };
    let local_id = match u16::try_from(raw.local_id) {
        Ok(id) if (1..=LOCAL_ID_SPAN).contains(&id) => id,
        _ => {
            tracing::warn!("skipping schedule {key:?}: local id out of range");
            return None;
        }
    };
    let Ok(created_at) = NaiveDateTime::parse_from_str(&raw.created_at, "%Y-%m-%d %H:%M:%S")
    else {
        tracing::warn!("skipping schedule {key:?}: bad created_at '{}'", raw.created_at);
        return None;
    };
    // A mangled access list degrades to owner-only visibility rather than
    // dropping the schedule.
    let extended_access: Vec<UserId> =
        serde_json::from_str(&raw.extended_access).unwrap_or_else(|e| {
            tracing::warn!("schedule {key:?}: bad access list, treating as empty: {e}");
            Vec::new()
        });

    Some(Schedule {
        owner_id: raw.owner_id,
        local_id,
        member: raw.member,
        anchor_date,
        time_of_day,
        recurrence,
        message: raw.message,
        project: raw.project,
        extended_access,
        created_at,
    })
}

#[async_trait]
impl ScheduleRepository for SqliteStore {
    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT owner_id, local_id, member_name, anchor_date, time_of_day, recurrence,
                        message, project, extended_access, created_at
                 FROM schedules ORDER BY created_at, owner_id, local_id",
            )
            .map_err(|e| HuddleError::Store(format!("List schedules: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    owner_id: row.get(0)?,
                    local_id: row.get(1)?,
                    member: row.get(2)?,
                    anchor_date: row.get(3)?,
                    time_of_day: row.get(4)?,
                    recurrence: row.get(5)?,
                    message: row.get(6)?,
                    project: row.get(7)?,
                    extended_access: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })
            .map_err(|e| HuddleError::Store(format!("List schedules: {e}")))?;

        Ok(rows
            .filter_map(|r| r.ok())
            .filter_map(decode_row)
            .collect())
    }

    async fn append_schedule(&self, schedule: &Schedule) -> Result<()> {
        self.lock()?
            .execute(
                "INSERT INTO schedules
                 (owner_id, local_id, member_name, anchor_date, time_of_day, recurrence,
                  message, project, extended_access, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    schedule.owner_id,
                    schedule.local_id,
                    schedule.member,
                    format_date(schedule.anchor_date),
                    schedule.time_of_day.to_string(),
                    schedule.recurrence.label(),
                    schedule.message,
                    schedule.project,
                    serde_json::to_string(&schedule.extended_access)
                        .map_err(|e| HuddleError::Store(format!("Encode access list: {e}")))?,
                    schedule.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                ],
            )
            .map_err(|e| HuddleError::Store(format!("Save schedule: {e}")))?;
        Ok(())
    }

    async fn delete_schedule(&self, owner: UserId, local_id: u16) -> Result<bool> {
        let changed = self
            .lock()?
            .execute(
                "DELETE FROM schedules WHERE owner_id = ?1 AND local_id = ?2",
                rusqlite::params![owner, local_id],
            )
            .map_err(|e| HuddleError::Store(format!("Delete schedule: {e}")))?;
        Ok(changed > 0)
    }

    async fn get_counter(&self, owner: UserId) -> Result<Option<u16>> {
        let conn = self.lock()?;
        match conn.query_row(
            "SELECT last_id FROM id_counters WHERE owner_id = ?1",
            [owner],
            |row| row.get::<_, i64>(0),
        ) {
            Ok(last) => Ok(u16::try_from(last).ok()),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(HuddleError::Store(format!("Read counter: {e}"))),
        }
    }

    async fn set_counter(&self, owner: UserId, value: u16) -> Result<()> {
        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO id_counters (owner_id, last_id) VALUES (?1, ?2)",
                rusqlite::params![owner, value],
            )
            .map_err(|e| HuddleError::Store(format!("Write counter: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClockTime, Meridiem};

    fn temp_store(name: &str) -> (SqliteStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("huddle-store-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        let store = SqliteStore::open(&dir.join("test.db")).unwrap();
        (store, dir)
    }

    fn sample(owner: UserId, local_id: u16) -> Schedule {
        let anchor = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        Schedule {
            owner_id: owner,
            local_id,
            member: "Ana".into(),
            anchor_date: anchor,
            time_of_day: ClockTime::new(8, 0, Meridiem::Pm).unwrap(),
            recurrence: Recurrence::Weekly,
            message: "Family night".into(),
            project: "Home".into(),
            extended_access: vec![20, 21],
            created_at: anchor.and_hms_opt(10, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn open_and_migrate_yields_an_empty_store() {
        let (store, dir) = temp_store("migrate");
        assert!(store.list_schedules().await.unwrap().is_empty());
        assert_eq!(store.get_counter(1).await.unwrap(), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn schedules_round_trip_through_the_store() {
        let (store, dir) = temp_store("roundtrip");
        let schedule = sample(7, 3);
        store.append_schedule(&schedule).await.unwrap();

        let loaded = store.list_schedules().await.unwrap();
        assert_eq!(loaded, vec![schedule]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn live_local_ids_cannot_collide() {
        let (store, dir) = temp_store("collide");
        store.append_schedule(&sample(7, 3)).await.unwrap();
        assert!(store.append_schedule(&sample(7, 3)).await.is_err());
        // Same id under another owner is fine.
        store.append_schedule(&sample(8, 3)).await.unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn deletion_frees_the_id_for_reuse() {
        let (store, dir) = temp_store("delete");
        store.append_schedule(&sample(7, 3)).await.unwrap();
        assert!(store.delete_schedule(7, 3).await.unwrap());
        assert!(!store.delete_schedule(7, 3).await.unwrap());
        store.append_schedule(&sample(7, 3)).await.unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_not_fatal() {
        let (store, dir) = temp_store("malformed");
        store.append_schedule(&sample(7, 1)).await.unwrap();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO schedules
                 (owner_id, local_id, member_name, anchor_date, time_of_day, recurrence,
                  message, project, extended_access, created_at)
                 VALUES (7, 2, 'Ana', 'not-a-date', '8:00 PM', 'Weekly', 'x', 'Home', '[]',
                         '2025-06-21 10:30:00')",
                [],
            )
            .unwrap();

        let loaded = store.list_schedules().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].local_id, 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn iso_anchor_dates_are_accepted_on_read() {
        let (store, dir) = temp_store("iso");
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO schedules
                 (owner_id, local_id, member_name, anchor_date, time_of_day, recurrence,
                  message, project, extended_access, created_at)
                 VALUES (7, 1, 'Ana', '2025-06-21', '8:00 PM', 'Weekly', 'x', 'Home', '[]',
                         '2025-06-21 10:30:00')",
                [],
            )
            .unwrap();
        let loaded = store.list_schedules().await.unwrap();
        assert_eq!(
            loaded[0].anchor_date,
            NaiveDate::from_ymd_opt(2025, 6, 21).unwrap()
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn mangled_access_lists_degrade_to_owner_only() {
        let (store, dir) = temp_store("access");
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO schedules
                 (owner_id, local_id, member_name, anchor_date, time_of_day, recurrence,
                  message, project, extended_access, created_at)
                 VALUES (7, 1, 'Ana', '06/21/2025', '8:00 PM', 'Weekly', 'x', 'Home', 'oops',
                         '2025-06-21 10:30:00')",
                [],
            )
            .unwrap();
        let loaded = store.list_schedules().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].extended_access.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn counters_persist_per_owner() {
        let (store, dir) = temp_store("counters");
        assert_eq!(store.get_counter(1).await.unwrap(), None);
        store.set_counter(1, 17).await.unwrap();
        store.set_counter(2, 499).await.unwrap();
        assert_eq!(store.get_counter(1).await.unwrap(), Some(17));
        assert_eq!(store.get_counter(2).await.unwrap(), Some(499));
        store.set_counter(1, 18).await.unwrap();
        assert_eq!(store.get_counter(1).await.unwrap(), Some(18));
        std::fs::remove_dir_all(&dir).ok();
    }
}
