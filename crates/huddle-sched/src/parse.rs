//! Creation-time input parsing.
//!
//! Pure functions: a typed value out, or a typed rejection the caller can
//! re-prompt on. Matching logic never sees raw strings.

use chrono::{Datelike, NaiveDate};
use huddle_core::ValidationError;

use crate::model::{ClockTime, Meridiem, Recurrence};

/// Month-name prefixes accepted in free-form dates.
const MONTHS: [(&str, u32); 12] = [
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Recurrence tokens, longest-match-irrelevant: checked in order, first
/// prefix hit wins.
const RECURRENCE_TOKENS: [(&str, Recurrence); 12] = [
    ("o", Recurrence::Once),
    ("once", Recurrence::Once),
    ("d", Recurrence::Daily),
    ("daily", Recurrence::Daily),
    ("w", Recurrence::Weekly),
    ("week", Recurrence::Weekly),
    ("weekly", Recurrence::Weekly),
    ("m", Recurrence::Monthly),
    ("month", Recurrence::Monthly),
    ("monthly", Recurrence::Monthly),
    ("y", Recurrence::Yearly),
    ("year", Recurrence::Yearly),
];

/// Parse the date forms members actually type.
///
/// Accepts `M/D/YY`, `M/D/YYYY`, digit runs `MMDDYY` / `MMDDYYYY`, and
/// month-name forms like `Jun 21 25` or `December 25, 2025`. A missing year
/// falls back to `today`'s year; two-digit years are 2000-based. The result
/// is always a valid Gregorian date.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError::BadDate);
    }
    if let Some(parts) = slash_date(s) {
        return make_date(parts);
    }
    if let Some(parts) = digit_run_date(s) {
        return make_date(parts);
    }
    if let Some(parts) = month_name_date(s, today) {
        return make_date(parts);
    }
    Err(ValidationError::BadDate)
}

fn make_date((month, day, year): (u32, u32, i32)) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(ValidationError::BadDate)
}

fn expand_year(year: i32) -> i32 {
    if year < 100 { year + 2000 } else { year }
}

/// `M/D/YY` or `M/D/YYYY`.
fn slash_date(s: &str) -> Option<(u32, u32, i32)> {
    let mut parts = s.split('/');
    let month = parts.next()?.trim().parse().ok()?;
    let day = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((month, day, expand_year(year)))
}

/// `MMDDYY` or `MMDDYYYY`.
fn digit_run_date(s: &str) -> Option<(u32, u32, i32)> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = s.get(0..2)?.parse().ok()?;
    let day: u32 = s.get(2..4)?.parse().ok()?;
    let year: i32 = match s.len() {
        6 => 2000 + s[4..6].parse::<i32>().ok()?,
        8 => s[4..8].parse().ok()?,
        _ => return None,
    };
    Some((month, day, year))
}

/// `Jun 21 25`, `June 21, 2025`, `Dec 25` (year defaults to `today`'s).
fn month_name_date(s: &str, today: NaiveDate) -> Option<(u32, u32, i32)> {
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    let first = tokens.first()?.to_ascii_lowercase();
    let (_, month) = MONTHS
        .into_iter()
        .find(|(name, _)| first.starts_with(name))?;
    let day: u32 = tokens.get(1)?.parse().ok()?;
    let year = match tokens.get(2) {
        Some(t) => expand_year(t.parse().ok()?),
        None => today.year(),
    };
    Some((month, day, year))
}

/// Normalize `9am`, `10:00PM`, `13:30`, `12`, `0:15` into a 12-hour time.
///
/// A missing meridiem defaults to AM for hours below 12 and PM otherwise;
/// 24-hour hours fold into PM; hour 0 is midnight. Out-of-range fields are
/// rejected rather than wrapped.
pub fn parse_time(input: &str) -> Result<ClockTime, ValidationError> {
    let s = input.trim().to_ascii_uppercase().replace('.', "");

    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || digits > 2 {
        return Err(ValidationError::BadTime);
    }
    let mut hour: u32 = s[..digits].parse().map_err(|_| ValidationError::BadTime)?;

    let mut rest = &s[digits..];
    let mut minute: u32 = 0;
    if let Some(r) = rest.strip_prefix(':') {
        if r.len() < 2 || !r.as_bytes()[..2].iter().all(u8::is_ascii_digit) {
            return Err(ValidationError::BadTime);
        }
        minute = r[..2].parse().map_err(|_| ValidationError::BadTime)?;
        rest = &r[2..];
    }

    let explicit = match rest.trim() {
        "" => None,
        "AM" => Some(Meridiem::Am),
        "PM" => Some(Meridiem::Pm),
        _ => return Err(ValidationError::BadTime),
    };

    if hour > 23 || minute > 59 {
        return Err(ValidationError::BadTime);
    }

    let mut meridiem = explicit.unwrap_or(if hour < 12 { Meridiem::Am } else { Meridiem::Pm });
    if hour > 12 {
        hour -= 12;
        meridiem = Meridiem::Pm;
    } else if hour == 0 {
        hour = 12;
        meridiem = Meridiem::Am;
    }

    ClockTime::new(hour as u8, minute as u8, meridiem).ok_or(ValidationError::BadTime)
}

/// Normalize a recurrence token: `o`/`once`, `d`/`daily`, `w`/`weekly`,
/// `m`/`monthly`, `y`/`yearly`, case-insensitive, prefix-matched.
pub fn parse_recurrence(input: &str) -> Result<Recurrence, ValidationError> {
    let s = input.trim().to_ascii_lowercase();
    RECURRENCE_TOKENS
        .into_iter()
        .find(|(prefix, _)| !s.is_empty() && s.starts_with(prefix))
        .map(|(_, r)| r)
        .ok_or(ValidationError::BadRecurrence)
}

/// Reminder text: trimmed, non-empty.
pub fn parse_message(input: &str) -> Result<String, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        Err(ValidationError::EmptyMessage)
    } else {
        Ok(s.to_string())
    }
}
