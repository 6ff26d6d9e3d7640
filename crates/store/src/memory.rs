use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use common::{CourseId, UserId};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{BookedCourse, BookingStore, CourseRow, NewCourse},
};

#[derive(Debug, Clone)]
struct BookingRow {
    user_id: UserId,
    course_id: CourseId,
    #[allow(dead_code)]
    booked_at: NaiveDateTime,
}

/// In-memory booking store implementation for testing.
///
/// Stores courses and bookings in memory and provides the same interface
/// and semantics as the PostgreSQL implementation, including uniqueness of
/// course occurrences and of (user, course) bookings.
///
/// Lock ordering: any method that takes both guards takes `courses`
/// before `bookings`.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    courses: Arc<RwLock<Vec<CourseRow>>>,
    bookings: Arc<RwLock<Vec<BookingRow>>>,
}

impl InMemoryBookingStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of course rows stored.
    pub async fn course_count(&self) -> usize {
        self.courses.read().await.len()
    }

    /// Returns the number of booking rows stored.
    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Clears all courses and bookings.
    pub async fn clear(&self) {
        self.courses.write().await.clear();
        self.bookings.write().await.clear();
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_course(&self, name: &str, starts_at: NaiveDateTime) -> Result<Option<CourseRow>> {
        let courses = self.courses.read().await;
        Ok(courses
            .iter()
            .find(|c| c.name == name && c.starts_at == starts_at)
            .cloned())
    }

    async fn reserve(&self, user_id: UserId, course: NewCourse) -> Result<CourseId> {
        // Hold both write guards for the whole operation so the
        // lookup-or-create plus booking insert is atomic, mirroring the
        // transaction in the PostgreSQL store.
        let mut courses = self.courses.write().await;
        let mut bookings = self.bookings.write().await;

        let course_id = match courses
            .iter()
            .find(|c| c.name == course.name && c.starts_at == course.starts_at)
        {
            Some(existing) => existing.id,
            None => {
                let id = CourseId::new();
                courses.push(CourseRow {
                    id,
                    name: course.name,
                    starts_at: course.starts_at,
                    duration_minutes: course.duration_minutes,
                    price_cents: course.price_cents,
                    coach: course.coach,
                });
                id
            }
        };

        if bookings
            .iter()
            .any(|b| b.user_id == user_id && b.course_id == course_id)
        {
            return Err(StoreError::DuplicateBooking { user_id, course_id });
        }

        bookings.push(BookingRow {
            user_id,
            course_id,
            booked_at: Utc::now().naive_utc(),
        });

        Ok(course_id)
    }

    async fn courses_for_user(&self, user_id: UserId) -> Result<Vec<BookedCourse>> {
        let courses = self.courses.read().await;
        let bookings = self.bookings.read().await;

        let mut result: Vec<BookedCourse> = bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| {
                courses
                    .iter()
                    .find(|c| c.id == b.course_id)
                    .map(|c| BookedCourse {
                        course_id: c.id,
                        course_name: c.name.clone(),
                        starts_at: c.starts_at,
                    })
            })
            .collect();

        result.sort_by(|a, b| b.starts_at.cmp(&a.starts_at));
        Ok(result)
    }

    async fn cancel_booking(&self, user_id: UserId, course_id: CourseId) -> Result<bool> {
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|b| !(b.user_id == user_id && b.course_id == course_id));
        Ok(bookings.len() < before)
    }
}
