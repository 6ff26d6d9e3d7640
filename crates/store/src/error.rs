use common::{CourseId, UserId};
use thiserror::Error;

/// Errors that can occur when interacting with the booking store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The user already holds a booking for this course occurrence.
    #[error("user {user_id} already booked course {course_id}")]
    DuplicateBooking {
        user_id: UserId,
        course_id: CourseId,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
