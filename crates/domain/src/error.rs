//! Domain error types.

use common::CourseId;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// The course name is not in the catalog.
    #[error("unknown course name: {name}")]
    UnknownCourse { name: String },

    /// The wire date/time pair could not be parsed.
    #[error("invalid date/time: {value}")]
    InvalidDateTime { value: String },

    /// The user already holds a booking for this course occurrence.
    #[error("already booked course {course_id}")]
    AlreadyBooked { course_id: CourseId },

    /// The user holds no booking for this course occurrence.
    #[error("no booking for course {course_id}")]
    NotBooked { course_id: CourseId },

    /// An error occurred in the booking store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
