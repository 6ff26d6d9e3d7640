//! Slot-to-booking reconciliation.
//!
//! Matches locally generated candidate slots against the course rows a user
//! has booked, so callers can mark slots as taken and resolve the course id
//! behind a booked slot. Matching compares timestamps, never formatted
//! strings.

use std::collections::{HashMap, HashSet};

use common::CourseId;
use store::BookedCourse;

use crate::catalog::CourseName;
use crate::slots::Slot;

/// Result of matching a slot list against a user's bookings.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    booked: HashSet<CourseId>,
    slot_courses: HashMap<u8, CourseId>,
}

impl Reconciliation {
    /// Whether the user holds a booking for this course occurrence.
    pub fn is_booked(&self, course_id: CourseId) -> bool {
        self.booked.contains(&course_id)
    }

    /// The course id recorded for a slot, if the user booked it.
    pub fn course_for_slot(&self, index: u8) -> Option<CourseId> {
        self.slot_courses.get(&index).copied()
    }

    /// The set of course ids the user has booked among the given slots.
    pub fn booked_course_ids(&self) -> &HashSet<CourseId> {
        &self.booked
    }
}

/// Matches each slot against the user's booked courses by (name, start
/// timestamp), building the booked set and the slot → course-id map.
pub fn reconcile(name: CourseName, slots: &[Slot], courses: &[BookedCourse]) -> Reconciliation {
    let mut result = Reconciliation::default();

    for slot in slots {
        let starts_at = slot.starts_at();
        let matching = courses
            .iter()
            .find(|course| course.course_name == name.as_str() && course.starts_at == starts_at);

        if let Some(course) = matching {
            result.booked.insert(course.course_id);
            result.slot_courses.insert(slot.index, course.course_id);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::upcoming_slots;
    use chrono::NaiveDate;

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 17).unwrap()
    }

    fn booked(name: CourseName, slot: &Slot) -> BookedCourse {
        BookedCourse {
            course_id: CourseId::new(),
            course_name: name.as_str().to_string(),
            starts_at: slot.starts_at(),
        }
    }

    #[test]
    fn empty_bookings_mark_nothing() {
        let slots = upcoming_slots(CourseName::Boxe, tuesday());
        let result = reconcile(CourseName::Boxe, &slots, &[]);
        assert!(result.booked_course_ids().is_empty());
        assert!(result.course_for_slot(1).is_none());
    }

    #[test]
    fn matching_booking_marks_its_slot() {
        let slots = upcoming_slots(CourseName::Boxe, tuesday());
        let course = booked(CourseName::Boxe, &slots[1]);

        let result = reconcile(CourseName::Boxe, &slots, std::slice::from_ref(&course));

        assert!(result.is_booked(course.course_id));
        assert_eq!(result.course_for_slot(2), Some(course.course_id));
        assert!(result.course_for_slot(1).is_none());
        assert!(result.course_for_slot(3).is_none());
    }

    #[test]
    fn bookings_for_other_courses_are_ignored() {
        let boxe_slots = upcoming_slots(CourseName::Boxe, tuesday());
        let mma_slots = upcoming_slots(CourseName::MMA, tuesday());
        let course = booked(CourseName::MMA, &mma_slots[0]);

        let result = reconcile(CourseName::Boxe, &boxe_slots, &[course]);
        assert!(result.booked_course_ids().is_empty());
    }

    #[test]
    fn same_name_different_time_does_not_match() {
        let slots = upcoming_slots(CourseName::Boxe, tuesday());
        let mut course = booked(CourseName::Boxe, &slots[0]);
        course.starts_at += chrono::Duration::hours(1);

        let result = reconcile(CourseName::Boxe, &slots, &[course]);
        assert!(result.booked_course_ids().is_empty());
    }
}
