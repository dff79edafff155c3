//! Report assembly: visibility filter, window filter, grouping, ordering,
//! passed flags. Pure and read-only; safe to run for many viewers at once.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::model::{Recurrence, Schedule, UserId, Window, format_date};
use crate::{access, matcher};

/// One reminder line in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub date: NaiveDate,
    pub time: crate::model::ClockTime,
    pub message: String,
    pub member: String,
    pub project: String,
    /// Already behind the clock (or the calendar, for one-shots). Grays the
    /// line; entries are never dropped for being passed within the day.
    pub passed: bool,
}

/// Non-empty recurrence-class group. Classes with no matching entries get no
/// section at all.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub class: Recurrence,
    pub entries: Vec<Entry>,
}

/// What a viewer sees for a window.
#[derive(Debug, Clone, Serialize)]
pub enum Report {
    /// At least one class matched. Sections appear in the fixed class order
    /// Once, Daily, Weekly, Monthly, Yearly.
    Sections {
        window: Window,
        /// Monday..Sunday span, populated for week queries so callers can
        /// title the report.
        week_span: Option<(NaiveDate, NaiveDate)>,
        sections: Vec<Section>,
    },
    /// Nothing due anywhere in the window.
    Empty,
}

/// Assemble the report `viewer` sees for `window` at the given local moment.
pub fn render(
    schedules: &[Schedule],
    viewer: UserId,
    window: Window,
    reference: NaiveDate,
    now: NaiveTime,
) -> Report {
    let mut sections = Vec::new();
    for class in Recurrence::ALL {
        let mut due: Vec<&Schedule> = schedules
            .iter()
            .filter(|s| s.recurrence == class)
            .filter(|s| access::visible(viewer, s))
            .filter(|s| matcher::matches(s, reference, window))
            .filter(|s| !matcher::suppressed_as_past_due(s, reference))
            .collect();
        // Stable sort: entries sharing a time keep their stored order.
        due.sort_by_key(|s| s.time_of_day.ordinal());
        if due.is_empty() {
            continue;
        }
        sections.push(Section {
            class,
            entries: due
                .into_iter()
                .map(|s| Entry {
                    date: s.anchor_date,
                    time: s.time_of_day,
                    message: s.message.clone(),
                    member: s.member.clone(),
                    project: s.project.clone(),
                    passed: matcher::already_passed(s, reference, now),
                })
                .collect(),
        });
    }

    if sections.is_empty() {
        return Report::Empty;
    }
    let week_span = match window {
        Window::ThisWeek => {
            let start = matcher::week_start(reference);
            Some((start, start + Duration::days(6)))
        }
        _ => None,
    };
    Report::Sections {
        window,
        week_span,
        sections,
    }
}

/// Everything `viewer` can see, regardless of date — past-due suppression
/// does not apply here. Ordered by class, then time of day.
pub fn list_visible(schedules: &[Schedule], viewer: UserId) -> Vec<Schedule> {
    let mut visible: Vec<Schedule> = schedules
        .iter()
        .filter(|s| access::visible(viewer, s))
        .cloned()
        .collect();
    visible.sort_by_key(|s| {
        let class_rank = Recurrence::ALL
            .iter()
            .position(|r| *r == s.recurrence)
            .unwrap_or(Recurrence::ALL.len());
        (class_rank, s.time_of_day.ordinal())
    });
    visible
}

/// Plain-text form of a report, one section per matched class.
pub fn render_text(report: &Report) -> String {
    let (window, week_span, sections) = match report {
        Report::Empty => return "No reminders scheduled.".to_string(),
        Report::Sections {
            window,
            week_span,
            sections,
        } => (window, week_span, sections),
    };

    let mut out = match (window, week_span) {
        (Window::Today, _) => "TODAY'S SCHEDULE\n".to_string(),
        (Window::Tomorrow, _) => "TOMORROW'S SCHEDULE\n".to_string(),
        (Window::ThisWeek, Some((start, end))) => format!(
            "WEEKLY SCHEDULE ({}-{})\n",
            start.format("%m/%d"),
            end.format("%m/%d")
        ),
        (Window::ThisWeek, None) => "WEEKLY SCHEDULE\n".to_string(),
    };

    for section in sections {
        out.push_str(&format!("\n{}\n", section.class.label().to_uppercase()));
        for entry in &section.entries {
            let marker = if entry.passed { " (passed)" } else { "" };
            out.push_str(&format!(
                "  {} | {} | {}{}\n    {}\n",
                entry.time, entry.project, entry.member, marker, entry.message
            ));
        }
    }
    out
}

/// One line per schedule for unfiltered listings.
pub fn list_text(schedules: &[Schedule]) -> String {
    if schedules.is_empty() {
        return "No reminders scheduled.".to_string();
    }
    let mut out = String::new();
    for s in schedules {
        out.push_str(&format!(
            "#{:<3} {:<8} {} {} | {} | {}\n",
            s.local_id,
            s.recurrence.label(),
            format_date(s.anchor_date),
            s.time_of_day,
            s.project,
            s.message
        ));
    }
    out
}
