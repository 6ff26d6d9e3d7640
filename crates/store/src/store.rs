use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::{CourseId, UserId};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A course occurrence to be created if no matching row exists yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    /// Club-local wall-clock start time (no timezone attached).
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub coach: String,
}

/// A persisted course occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    pub id: CourseId,
    pub name: String,
    pub starts_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub coach: String,
}

/// A course occurrence joined with the caller's booking, as returned by
/// [`BookingStore::courses_for_user`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedCourse {
    pub course_id: CourseId,
    pub course_name: String,
    pub starts_at: NaiveDateTime,
}

/// Core trait for booking persistence.
///
/// All implementations must be thread-safe (Send + Sync). The write path
/// must be atomic: a reservation either creates/reuses the course row and
/// records the booking, or leaves the store untouched.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Looks up a course occurrence by its logical key (name, start time).
    async fn find_course(&self, name: &str, starts_at: NaiveDateTime) -> Result<Option<CourseRow>>;

    /// Reserves a slot for a user.
    ///
    /// Looks up the course occurrence by (name, starts_at), creating it if
    /// absent, then records the user's booking against it. The two steps run
    /// atomically; a concurrent first-time reservation for the same slot
    /// must still yield exactly one course row.
    ///
    /// Returns the ID of the course the booking was recorded against.
    /// Fails with [`StoreError::DuplicateBooking`] if the user already holds
    /// a booking for that course.
    ///
    /// [`StoreError::DuplicateBooking`]: crate::StoreError::DuplicateBooking
    async fn reserve(&self, user_id: UserId, course: NewCourse) -> Result<CourseId>;

    /// Returns all course occurrences the user has booked, most recent
    /// start time first.
    async fn courses_for_user(&self, user_id: UserId) -> Result<Vec<BookedCourse>>;

    /// Removes the user's booking for a course.
    ///
    /// Returns `true` if a booking was deleted, `false` if none existed.
    /// The course row itself is never deleted.
    async fn cancel_booking(&self, user_id: UserId, course_id: CourseId) -> Result<bool>;
}
