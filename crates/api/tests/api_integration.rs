//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDateTime};
use common::{CourseId, UserId};
use domain::{CourseName, upcoming_slots};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{BookedCourse, BookingStore, CourseRow, InMemoryBookingStore, NewCourse, StoreError};
use tower::ServiceExt;

use api::auth::JwtKeys;
use api::routes::bookings::AppState;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

const TEST_SECRET: &str = "test-secret";

fn setup() -> (axum::Router, Arc<AppState<InMemoryBookingStore>>) {
    let store = InMemoryBookingStore::new();
    let state = api::create_state(store, JwtKeys::new(TEST_SECRET));
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

/// Store whose every method fails with a database error, for exercising
/// the internal-error response mapping.
#[derive(Clone)]
struct FailingStore;

#[async_trait::async_trait]
impl BookingStore for FailingStore {
    async fn find_course(
        &self,
        _name: &str,
        _starts_at: NaiveDateTime,
    ) -> store::Result<Option<CourseRow>> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn reserve(&self, _user_id: UserId, _course: NewCourse) -> store::Result<CourseId> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn courses_for_user(&self, _user_id: UserId) -> store::Result<Vec<BookedCourse>> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn cancel_booking(
        &self,
        _user_id: UserId,
        _course_id: CourseId,
    ) -> store::Result<bool> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

fn setup_failing() -> axum::Router {
    let state = api::create_state(FailingStore, JwtKeys::new(TEST_SECRET));
    api::create_app(state, get_metrics_handle())
}

fn token_for(user: UserId) -> String {
    JwtKeys::new(TEST_SECRET)
        .issue(user, Duration::hours(1))
        .unwrap()
}

fn booking_body(name: &str, date: &str, time: &str) -> String {
    serde_json::to_string(&serde_json::json!({
        "course_name": name,
        "date": date,
        "time": time,
        "duration": "2 hours",
    }))
    .unwrap()
}

async fn post_booking(
    app: &axum::Router,
    token: &str,
    body: String,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/bookings")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// A slot for Boxe relative to the server's clock, matching what the slots
/// endpoint generates.
fn first_boxe_slot() -> (String, String) {
    let today = chrono::Local::now().date_naive();
    let slot = upcoming_slots(CourseName::Boxe, today)[0];
    (slot.formatted_date(), slot.time.format("%H:%M").to_string())
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/user/previous-courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_is_forbidden() {
    let (app, _) = setup();

    let (status, _) = get_json(&app, "/user/previous-courses", "not-a-jwt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let (app, _) = setup();
    let token = JwtKeys::new(TEST_SECRET)
        .issue(UserId::new(), Duration::hours(-2))
        .unwrap();

    let (status, _) = get_json(&app, "/user/previous-courses", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_booking() {
    let (app, state) = setup();
    let token = token_for(UserId::new());
    let (date, time) = first_boxe_slot();

    let (status, json) = post_booking(&app, &token, booking_body("Boxe", &date, &time)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["course_id"].as_str().is_some());
    assert_eq!(state.booking_service.store().course_count().await, 1);
}

#[tokio::test]
async fn test_booking_appears_in_previous_courses() {
    let (app, _) = setup();
    let token = token_for(UserId::new());
    let (date, time) = first_boxe_slot();

    let (_, created) = post_booking(&app, &token, booking_body("Boxe", &date, &time)).await;

    let (status, json) = get_json(&app, "/user/previous-courses", &token).await;
    assert_eq!(status, StatusCode::OK);

    let courses = json["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["course_name"], "Boxe");
    assert_eq!(courses[0]["course_id"], created["course_id"]);
}

#[tokio::test]
async fn test_unknown_course_name_is_rejected_before_any_write() {
    let (app, state) = setup();
    let token = token_for(UserId::new());

    let (status, json) =
        post_booking(&app, &token, booking_body("Aquagym", "19/06/2025", "18:00")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Aquagym"));
    assert_eq!(state.booking_service.store().course_count().await, 0);
}

#[tokio::test]
async fn test_malformed_date_is_rejected() {
    let (app, _) = setup();
    let token = token_for(UserId::new());

    let (status, _) =
        post_booking(&app, &token, booking_body("Boxe", "2025-06-19", "18:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_duration_is_a_missing_field() {
    let (app, _) = setup();
    let token = token_for(UserId::new());

    let body = serde_json::to_string(&serde_json::json!({
        "course_name": "Boxe",
        "date": "19/06/2025",
        "time": "18:00",
        "duration": "",
    }))
    .unwrap();

    let (status, json) = post_booking(&app, &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("duration"));
}

#[tokio::test]
async fn test_double_booking_is_a_conflict() {
    let (app, _) = setup();
    let token = token_for(UserId::new());
    let (date, time) = first_boxe_slot();

    let (first, _) = post_booking(&app, &token, booking_body("Boxe", &date, &time)).await;
    let (second, _) = post_booking(&app, &token, booking_body("Boxe", &date, &time)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_two_users_share_one_course_row() {
    let (app, state) = setup();
    let (date, time) = first_boxe_slot();

    let (_, first) = post_booking(
        &app,
        &token_for(UserId::new()),
        booking_body("Boxe", &date, &time),
    )
    .await;
    let (status, second) = post_booking(
        &app,
        &token_for(UserId::new()),
        booking_body("Boxe", &date, &time),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["course_id"], second["course_id"]);
    assert_eq!(state.booking_service.store().course_count().await, 1);
    assert_eq!(state.booking_service.store().booking_count().await, 2);
}

#[tokio::test]
async fn test_slots_show_booked_state_after_confirm() {
    let (app, _) = setup();
    let token = token_for(UserId::new());
    let (date, time) = first_boxe_slot();

    post_booking(&app, &token, booking_body("Boxe", &date, &time)).await;

    let (status, json) = get_json(&app, "/courses/Boxe/slots", &token).await;
    assert_eq!(status, StatusCode::OK);

    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["booked"], true);
    assert!(slots[0]["course_id"].as_str().is_some());
    assert_eq!(slots[1]["booked"], false);
    assert_eq!(slots[2]["booked"], false);
}

#[tokio::test]
async fn test_slots_for_unknown_course_are_empty() {
    let (app, _) = setup();
    let token = token_for(UserId::new());

    let (status, json) = get_json(&app, "/courses/Aquagym/slots", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["slots"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_cancel_round_trip() {
    let (app, _) = setup();
    let token = token_for(UserId::new());
    let (date, time) = first_boxe_slot();

    let (_, created) = post_booking(&app, &token, booking_body("Boxe", &date, &time)).await;
    let course_id = created["course_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/user/course/{course_id}"))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The slot is unbooked again.
    let (_, json) = get_json(&app, "/courses/Boxe/slots", &token).await;
    assert_eq!(json["slots"][0]["booked"], false);
}

#[tokio::test]
async fn test_cancel_missing_booking_is_benign_not_found() {
    let (app, _) = setup();
    let token = token_for(UserId::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/user/course/{}", uuid::Uuid::new_v4()))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_on_slots_is_an_internal_error() {
    let app = setup_failing();
    let token = token_for(UserId::new());

    let (status, json) = get_json(&app, "/courses/Boxe/slots", &token).await;

    // A broken store must never look like an all-available slot list.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().is_some());
    assert!(json.get("slots").is_none());
}

#[tokio::test]
async fn test_store_failure_on_previous_courses_is_an_internal_error() {
    let app = setup_failing();
    let token = token_for(UserId::new());

    let (status, json) = get_json(&app, "/user/previous-courses", &token).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().is_some());
    assert!(json.get("courses").is_none());
}
