//! Static course catalog.
//!
//! Every bookable course runs once a week at a fixed time with a fixed
//! coach. The club offers six courses; anything else is rejected before a
//! single row is written.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Session length, identical for every course.
pub const DURATION_MINUTES: i32 = 120;

/// Course sessions are included in the membership, so the bookable price
/// is always zero.
pub const PRICE_CENTS: i64 = 0;

/// The fixed set of bookable course names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseName {
    #[serde(rename = "Cours Collectifs")]
    CoursCollectifs,
    #[serde(rename = "Pole Dance")]
    PoleDance,
    Crosstraining,
    Boxe,
    #[serde(rename = "Haltérophilie")]
    Halterophilie,
    MMA,
}

/// Weekly schedule entry for a course: the day it runs, when it starts,
/// and who coaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseSchedule {
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub coach: &'static str,
}

impl CourseName {
    /// All bookable courses, in weekday order.
    pub fn all() -> [CourseName; 6] {
        [
            CourseName::CoursCollectifs,
            CourseName::PoleDance,
            CourseName::Crosstraining,
            CourseName::Boxe,
            CourseName::Halterophilie,
            CourseName::MMA,
        ]
    }

    /// The display name used on the wire and stored in the course table.
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseName::CoursCollectifs => "Cours Collectifs",
            CourseName::PoleDance => "Pole Dance",
            CourseName::Crosstraining => "Crosstraining",
            CourseName::Boxe => "Boxe",
            CourseName::Halterophilie => "Haltérophilie",
            CourseName::MMA => "MMA",
        }
    }

    /// The weekly schedule for this course.
    pub fn schedule(&self) -> CourseSchedule {
        let start_time = NaiveTime::from_hms_opt(18, 0, 0).expect("valid time");
        let (weekday, coach) = match self {
            CourseName::CoursCollectifs => (Weekday::Mon, "Anna"),
            CourseName::PoleDance => (Weekday::Tue, "Marc"),
            CourseName::Crosstraining => (Weekday::Wed, "Léa"),
            CourseName::Boxe => (Weekday::Thu, "Paul"),
            CourseName::Halterophilie => (Weekday::Fri, "Sophie"),
            CourseName::MMA => (Weekday::Sat, "Lucas"),
        };
        CourseSchedule {
            weekday,
            start_time,
            coach,
        }
    }
}

impl std::fmt::Display for CourseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CourseName {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseName::all()
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| BookingError::UnknownCourse {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn every_course_parses_from_its_display_name() {
        for name in CourseName::all() {
            assert_eq!(CourseName::from_str(name.as_str()).unwrap(), name);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = CourseName::from_str("Aquagym").unwrap_err();
        assert!(matches!(err, BookingError::UnknownCourse { ref name } if name == "Aquagym"));
    }

    #[test]
    fn boxe_runs_thursdays_with_paul() {
        let schedule = CourseName::Boxe.schedule();
        assert_eq!(schedule.weekday, Weekday::Thu);
        assert_eq!(schedule.coach, "Paul");
        assert_eq!(schedule.start_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&CourseName::Halterophilie).unwrap();
        assert_eq!(json, "\"Haltérophilie\"");
        let parsed: CourseName = serde_json::from_str("\"Pole Dance\"").unwrap();
        assert_eq!(parsed, CourseName::PoleDance);
    }
}
