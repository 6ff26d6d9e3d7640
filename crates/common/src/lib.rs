//! Shared types for the gym booking system.

pub mod types;

pub use types::{CourseId, UserId};
