//! Booking service providing a high-level API over the store.

use chrono::{NaiveDate, NaiveDateTime};
use common::{CourseId, UserId};
use store::{BookedCourse, BookingStore, NewCourse, StoreError};

use crate::catalog::{CourseName, DURATION_MINUTES, PRICE_CENTS};
use crate::error::BookingError;
use crate::reconcile::reconcile;
use crate::slots::{Slot, upcoming_slots};

/// A generated slot annotated with the caller's booking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub slot: Slot,
    /// The persisted course this slot resolved to, if the caller booked it.
    pub course_id: Option<CourseId>,
}

impl SlotStatus {
    pub fn is_booked(&self) -> bool {
        self.course_id.is_some()
    }
}

/// Service for managing course bookings.
///
/// Wraps a [`BookingStore`] and enforces the catalog: course rows are only
/// ever created with the duration, price, and coach the catalog defines,
/// regardless of what the caller sent.
pub struct BookingService<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> BookingService<S> {
    /// Creates a new booking service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Confirms a slot selection: resolves or creates the course occurrence
    /// and records the caller's booking against it, atomically.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(
        &self,
        user_id: UserId,
        name: CourseName,
        starts_at: NaiveDateTime,
    ) -> Result<CourseId, BookingError> {
        let schedule = name.schedule();
        let course = NewCourse {
            name: name.as_str().to_string(),
            starts_at,
            duration_minutes: DURATION_MINUTES,
            price_cents: PRICE_CENTS,
            coach: schedule.coach.to_string(),
        };

        let course_id = self
            .store
            .reserve(user_id, course)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateBooking { course_id, .. } => {
                    BookingError::AlreadyBooked { course_id }
                }
                other => BookingError::Store(other),
            })?;

        metrics::counter!("bookings_confirmed_total").increment(1);
        tracing::info!(%user_id, %course_id, course = %name, "booking confirmed");
        Ok(course_id)
    }

    /// Cancels the caller's booking for a course occurrence.
    ///
    /// A missing booking is reported as [`BookingError::NotBooked`]; callers
    /// may treat it as benign (already cancelled elsewhere). The course row
    /// is left in place.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, user_id: UserId, course_id: CourseId) -> Result<(), BookingError> {
        let deleted = self.store.cancel_booking(user_id, course_id).await?;
        if !deleted {
            return Err(BookingError::NotBooked { course_id });
        }
        metrics::counter!("bookings_cancelled_total").increment(1);
        tracing::info!(%user_id, %course_id, "booking cancelled");
        Ok(())
    }

    /// Lists the caller's booked course occurrences, most recent first.
    #[tracing::instrument(skip(self))]
    pub async fn previous_courses(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BookedCourse>, BookingError> {
        Ok(self.store.courses_for_user(user_id).await?)
    }

    /// Generates the upcoming slots for a course and reconciles them
    /// against the caller's bookings.
    #[tracing::instrument(skip(self))]
    pub async fn slots_for_user(
        &self,
        user_id: UserId,
        name: CourseName,
        today: NaiveDate,
    ) -> Result<Vec<SlotStatus>, BookingError> {
        let slots = upcoming_slots(name, today);
        let courses = self.store.courses_for_user(user_id).await?;
        let reconciliation = reconcile(name, &slots, &courses);

        Ok(slots
            .into_iter()
            .map(|slot| SlotStatus {
                course_id: reconciliation.course_for_slot(slot.index),
                slot,
            })
            .collect())
    }
}
