//! Domain layer for the gym booking system.
//!
//! This crate provides:
//! - the static course catalog (name, weekday, start time, coach)
//! - slot generation for the next three weekly occurrences of a course
//! - reconciliation of generated slots against a user's recorded bookings
//! - the [`BookingService`] driving confirm/cancel/list over a store

pub mod catalog;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod slots;

pub use catalog::{CourseName, CourseSchedule, DURATION_MINUTES, PRICE_CENTS};
pub use error::BookingError;
pub use reconcile::{Reconciliation, reconcile};
pub use service::{BookingService, SlotStatus};
pub use slots::{SLOTS_PER_COURSE, Slot, parse_wire_datetime, upcoming_slots};
