//! Persistence layer for the gym booking system.
//!
//! Provides the [`BookingStore`] trait with two implementations:
//! - [`PostgresBookingStore`] — production store backed by sqlx/PostgreSQL
//! - [`InMemoryBookingStore`] — in-process store for tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{CourseId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryBookingStore;
pub use postgres::PostgresBookingStore;
pub use store::{BookedCourse, BookingStore, CourseRow, NewCourse};
