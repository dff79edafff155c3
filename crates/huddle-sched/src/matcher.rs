//! Window membership for each recurrence class, plus the past-due rules.
//!
//! Everything here is pure: a schedule, a reference date, and a window go in,
//! a decision comes out. Queries for independent viewers can run in parallel
//! with no shared state.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::model::{Recurrence, Schedule, Window};

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Does `schedule` have an instance inside `window`, viewed from `reference`?
pub fn matches(schedule: &Schedule, reference: NaiveDate, window: Window) -> bool {
    match window {
        Window::Today => matches_on(schedule, reference),
        Window::Tomorrow => matches_on(schedule, reference + Duration::days(1)),
        Window::ThisWeek => matches_week(schedule, reference),
    }
}

fn matches_on(schedule: &Schedule, target: NaiveDate) -> bool {
    let anchor = schedule.anchor_date;
    match schedule.recurrence {
        Recurrence::Once => anchor == target,
        Recurrence::Daily => true,
        Recurrence::Weekly => anchor.weekday() == target.weekday(),
        Recurrence::Monthly => anchor.day() == target.day(),
        Recurrence::Yearly => (anchor.month(), anchor.day()) == (target.month(), target.day()),
    }
}

fn matches_week(schedule: &Schedule, reference: NaiveDate) -> bool {
    let start = week_start(reference);
    let end = start + Duration::days(6);
    let anchor = schedule.anchor_date;
    match schedule.recurrence {
        Recurrence::Once => start <= anchor && anchor <= end,
        Recurrence::Daily => true,
        // Every week contains exactly one instance of the anchor weekday.
        Recurrence::Weekly => true,
        // Numeric day-of-month range. When the week spans a month boundary
        // (say Jan 29 - Feb 4) the range 29..=4 is empty and day-30/31
        // anchors miss even though those days fall inside the week. Kept
        // pending a product decision; see DESIGN.md.
        Recurrence::Monthly => start.day() <= anchor.day() && anchor.day() <= end.day(),
        Recurrence::Yearly => (0..7).any(|i| {
            let day = start + Duration::days(i);
            (day.month(), day.day()) == (anchor.month(), anchor.day())
        }),
    }
}

/// Past-due suppression for date-filtered views: only `Once` schedules whose
/// anchor has already elapsed are hidden. Recurring classes are expected to
/// recur no matter how old their anchor is. Unfiltered listings bypass this.
pub fn suppressed_as_past_due(schedule: &Schedule, reference: NaiveDate) -> bool {
    schedule.recurrence == Recurrence::Once && schedule.anchor_date < reference
}

/// Display-time "already passed" flag. Grays an entry, never filters it.
///
/// For `Once` the date decides first: an anchor before today is always
/// passed, after today never. On the anchor day (and for every recurring
/// class) the clock decides.
pub fn already_passed(schedule: &Schedule, reference: NaiveDate, now: NaiveTime) -> bool {
    if schedule.recurrence == Recurrence::Once {
        if schedule.anchor_date < reference {
            return true;
        }
        if schedule.anchor_date > reference {
            return false;
        }
    }
    now > schedule.time_of_day.to_naive()
}
