//! Candidate slot generation.
//!
//! Slots are ephemeral: a pure projection of (course name, today) onto the
//! next weekly occurrences of the course. They carry no identity until a
//! booking matches them to a persisted course row.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::catalog::CourseName;
use crate::error::BookingError;

/// Number of upcoming occurrences offered per course.
pub const SLOTS_PER_COURSE: usize = 3;

/// One candidate occurrence of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// 1-based position in the generated sequence.
    pub index: u8,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub coach: &'static str,
}

impl Slot {
    /// The slot's start as a single wall-clock timestamp, the form used
    /// for matching against course rows.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// The slot's date in the `DD/MM/YYYY` wire format.
    pub fn formatted_date(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Generates the next [`SLOTS_PER_COURSE`] weekly occurrences of a course,
/// starting from `today`.
///
/// If `today` falls on the course's weekday, the first slot is today, not
/// next week. Deterministic for a fixed (name, today) pair.
pub fn upcoming_slots(name: CourseName, today: NaiveDate) -> Vec<Slot> {
    let schedule = name.schedule();
    let target = schedule.weekday.num_days_from_sunday();
    let current = today.weekday().num_days_from_sunday();
    let offset = (target + 7 - current) % 7;

    (0..SLOTS_PER_COURSE)
        .map(|i| Slot {
            index: (i + 1) as u8,
            date: today
                .checked_add_days(Days::new(u64::from(offset) + i as u64 * 7))
                .expect("date within range"),
            time: schedule.start_time,
            coach: schedule.coach,
        })
        .collect()
}

/// Parses the wire `DD/MM/YYYY` + `HH:MM` pair into one timestamp.
///
/// The wire keeps the original split format for compatibility, but the
/// parsed timestamp is the only representation used past this boundary.
pub fn parse_wire_datetime(date: &str, time: &str) -> Result<NaiveDateTime, BookingError> {
    let invalid = || BookingError::InvalidDateTime {
        value: format!("{date} {time}"),
    };
    let date = NaiveDate::parse_from_str(date, "%d/%m/%Y").map_err(|_| invalid())?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| invalid())?;
    Ok(date.and_time(time))
}
