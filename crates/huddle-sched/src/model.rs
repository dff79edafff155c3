//! Schedule data model — the records the matcher, views, and stores share.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Stable numeric member identity, as issued by the chat transport.
pub type UserId = i64;

/// Highest local id an owner can hold; allocation wraps past this.
pub const LOCAL_ID_SPAN: u16 = 500;

/// Cap on delegated viewers per schedule (space manager + four admins).
pub const MAX_EXTENDED_ACCESS: usize = 5;

/// How a schedule recurs, and therefore which fields of its anchor date are
/// authoritative when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recurrence {
    /// Fires on the anchor date only.
    Once,
    /// Fires every day; the anchor only records when it started.
    Daily,
    /// Fires on the anchor's weekday.
    Weekly,
    /// Fires on the anchor's day-of-month.
    Monthly,
    /// Fires on the anchor's (month, day).
    Yearly,
}

impl Recurrence {
    /// Fixed grouping order for reports.
    pub const ALL: [Recurrence; 5] = [
        Recurrence::Once,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::Yearly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::Once => "Once",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Yearly => "Yearly",
        }
    }

    /// Exact label match, as stored in the schedules table.
    pub fn from_label(label: &str) -> Option<Recurrence> {
        Recurrence::ALL.into_iter().find(|r| r.label() == label)
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// AM/PM half of a 12-hour clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl std::fmt::Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        })
    }
}

/// Wall-clock time in the 12-hour form schedules are entered and shown in.
/// Construction validates the fields, so a held value always renders and
/// sorts cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl ClockTime {
    /// Build from 12-hour parts: `hour` in 1..=12, `minute` in 0..=59.
    pub fn new(hour: u8, minute: u8, meridiem: Meridiem) -> Option<Self> {
        if (1..=12).contains(&hour) && minute < 60 {
            Some(Self {
                hour,
                minute,
                meridiem,
            })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Minutes since midnight — the sort ordinal within a report section.
    pub fn ordinal(&self) -> u16 {
        let hour24 = match (self.hour % 12, self.meridiem) {
            (h, Meridiem::Am) => h,
            (h, Meridiem::Pm) => h + 12,
        };
        hour24 as u16 * 60 + self.minute as u16
    }

    /// 24-hour equivalent, for comparing against the current clock.
    pub fn to_naive(&self) -> NaiveTime {
        let ordinal = self.ordinal();
        NaiveTime::from_hms_opt(ordinal as u32 / 60, ordinal as u32 % 60, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl std::fmt::Display for ClockTime {
    /// `H:MM AM/PM`, minutes zero-padded.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

impl PartialOrd for ClockTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClockTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

/// Named query range for due-schedule lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Window {
    Today,
    Tomorrow,
    /// Monday-start, 7-day week containing the reference date.
    ThisWeek,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Today, Window::Tomorrow, Window::ThisWeek];

    /// The token the presentation boundary uses for this window.
    pub fn token(&self) -> &'static str {
        match self {
            Window::Today => "today",
            Window::Tomorrow => "tomorrow",
            Window::ThisWeek => "thisweek",
        }
    }

    pub fn parse(token: &str) -> Option<Window> {
        Window::ALL
            .into_iter()
            .find(|w| w.token() == token.trim().to_ascii_lowercase())
    }
}

/// A registered reminder. Immutable once created; edits are delete plus
/// recreate, so every field is fixed for the record's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Creator identity; scopes `local_id` uniqueness and default visibility.
    pub owner_id: UserId,
    /// Small per-owner id in `[1, LOCAL_ID_SPAN]`, cyclically reused after
    /// deletion frees it.
    pub local_id: u16,
    /// Creator display name, carried into report entries.
    pub member: String,
    /// Calendar date recorded at creation. Which fields matter depends on
    /// `recurrence`.
    pub anchor_date: NaiveDate,
    pub time_of_day: ClockTime,
    pub recurrence: Recurrence,
    pub message: String,
    /// Grouping label only; never consulted by recurrence logic.
    pub project: String,
    /// Up to [`MAX_EXTENDED_ACCESS`] additional identities allowed to view
    /// this schedule besides the owner.
    pub extended_access: Vec<UserId>,
    pub created_at: NaiveDateTime,
}

/// Input for [`crate::engine::ScheduleEngine::create`] — everything but the
/// allocated id and the creation stamp.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    pub owner_id: UserId,
    pub member: String,
    pub anchor_date: NaiveDate,
    pub time_of_day: ClockTime,
    pub recurrence: Recurrence,
    pub message: String,
    pub project: String,
    pub extended_access: Vec<UserId>,
}

/// `MM/DD/YYYY` — the form anchor dates are stored and displayed in.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}
