//! Booking endpoints: confirm, cancel, list, and slot availability.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use common::CourseId;
use domain::{BookingService, CourseName, parse_wire_datetime};
use serde::{Deserialize, Serialize};
use store::BookingStore;
use uuid::Uuid;

use crate::auth::{AuthUser, JwtKeys};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: BookingStore> {
    pub booking_service: BookingService<S>,
    pub jwt: JwtKeys,
}

impl<S: BookingStore> FromRef<Arc<AppState<S>>> for JwtKeys {
    fn from_ref(state: &Arc<AppState<S>>) -> Self {
        state.jwt.clone()
    }
}

// -- Request types --

#[derive(Deserialize)]
pub struct BookingRequest {
    pub course_name: String,
    /// `DD/MM/YYYY`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Required on the wire for contract compatibility; the stored duration
    /// is derived from the catalog, not from this field.
    pub duration: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct BookingCreatedResponse {
    pub course_id: CourseId,
}

#[derive(Serialize)]
pub struct PreviousCourseResponse {
    pub course_name: String,
    pub course_datetime: NaiveDateTime,
    pub course_id: CourseId,
}

#[derive(Serialize)]
pub struct PreviousCoursesResponse {
    pub courses: Vec<PreviousCourseResponse>,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct SlotResponse {
    pub id: u8,
    /// `DD/MM/YYYY`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub coach: &'static str,
    pub booked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub course: String,
    pub slots: Vec<SlotResponse>,
}

// -- Handlers --

/// POST /bookings — confirm a slot selection.
///
/// Validates the payload and the course name before touching the store;
/// the course lookup-or-create and the booking insert run atomically.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>), ApiError> {
    for (field, value) in [
        ("course_name", &req.course_name),
        ("date", &req.date),
        ("time", &req.time),
        ("duration", &req.duration),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("missing field: {field}")));
        }
    }

    let name = CourseName::from_str(&req.course_name)?;
    let starts_at = parse_wire_datetime(&req.date, &req.time)?;

    let course_id = state.booking_service.confirm(user_id, name, starts_at).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse { course_id }),
    ))
}

/// GET /user/previous-courses — list the caller's booked courses,
/// most recent start time first.
#[tracing::instrument(skip(state))]
pub async fn previous_courses<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PreviousCoursesResponse>, ApiError> {
    let courses = state.booking_service.previous_courses(user_id).await?;

    Ok(Json(PreviousCoursesResponse {
        courses: courses
            .into_iter()
            .map(|c| PreviousCourseResponse {
                course_name: c.course_name,
                course_datetime: c.starts_at,
                course_id: c.course_id,
            })
            .collect(),
    }))
}

/// DELETE /user/course/{course_id} — cancel the caller's booking.
///
/// 404 if the caller holds no booking for that course; callers may treat
/// that as already-cancelled.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CancelResponse>, ApiError> {
    state
        .booking_service
        .cancel(user_id, CourseId::from_uuid(course_id))
        .await?;

    Ok(Json(CancelResponse {
        message: "booking cancelled",
    }))
}

/// GET /courses/{course_name}/slots — upcoming slots for a course,
/// reconciled against the caller's bookings.
///
/// An unknown course name yields an empty slot list, not an error.
#[tracing::instrument(skip(state))]
pub async fn slots<S: BookingStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Path(course_name): Path<String>,
) -> Result<Json<SlotsResponse>, ApiError> {
    let Ok(name) = CourseName::from_str(&course_name) else {
        return Ok(Json(SlotsResponse {
            course: course_name,
            slots: Vec::new(),
        }));
    };

    let today = chrono::Local::now().date_naive();
    let statuses = state
        .booking_service
        .slots_for_user(user_id, name, today)
        .await?;

    Ok(Json(SlotsResponse {
        course: course_name,
        slots: statuses
            .into_iter()
            .map(|status| SlotResponse {
                id: status.slot.index,
                date: status.slot.formatted_date(),
                time: status.slot.time.format("%H:%M").to_string(),
                coach: status.slot.coach,
                booked: status.is_booked(),
                course_id: status.course_id,
            })
            .collect(),
    }))
}
