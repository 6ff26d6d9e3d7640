use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::{CourseId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, StoreError,
    store::{BookedCourse, BookingStore, CourseRow, NewCourse},
};

/// PostgreSQL-backed booking store implementation.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Creates a new PostgreSQL booking store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_course(row: PgRow) -> Result<CourseRow> {
        Ok(CourseRow {
            id: CourseId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            starts_at: row.try_get("starts_at")?,
            duration_minutes: row.try_get("duration_minutes")?,
            price_cents: row.try_get("price_cents")?,
            coach: row.try_get("coach")?,
        })
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn find_course(&self, name: &str, starts_at: NaiveDateTime) -> Result<Option<CourseRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, starts_at, duration_minutes, price_cents, coach
            FROM course
            WHERE name = $1 AND starts_at = $2
            "#,
        )
        .bind(name)
        .bind(starts_at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_course).transpose()
    }

    async fn reserve(&self, user_id: UserId, course: NewCourse) -> Result<CourseId> {
        let mut tx = self.pool.begin().await?;

        // Lookup-or-create the course row by its logical key. The unique
        // constraint on (name, starts_at) closes the check-then-act race:
        // a concurrent first-time writer for the same slot makes the insert
        // hit the conflict arm, and we re-read the winner's row instead.
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM course WHERE name = $1 AND starts_at = $2")
                .bind(&course.name)
                .bind(course.starts_at)
                .fetch_optional(&mut *tx)
                .await?;

        let course_id = match existing {
            Some(id) => CourseId::from_uuid(id),
            None => {
                let inserted: Option<Uuid> = sqlx::query_scalar(
                    r#"
                    INSERT INTO course (id, name, starts_at, duration_minutes, price_cents, coach)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT ON CONSTRAINT course_name_starts_at_key DO NOTHING
                    RETURNING id
                    "#,
                )
                .bind(CourseId::new().as_uuid())
                .bind(&course.name)
                .bind(course.starts_at)
                .bind(course.duration_minutes)
                .bind(course.price_cents)
                .bind(&course.coach)
                .fetch_optional(&mut *tx)
                .await?;

                match inserted {
                    Some(id) => {
                        tracing::debug!(course = %course.name, starts_at = %course.starts_at, "created course row");
                        CourseId::from_uuid(id)
                    }
                    None => {
                        // Lost the race; the winner's row is committed now.
                        let id: Uuid = sqlx::query_scalar(
                            "SELECT id FROM course WHERE name = $1 AND starts_at = $2",
                        )
                        .bind(&course.name)
                        .bind(course.starts_at)
                        .fetch_one(&mut *tx)
                        .await?;
                        CourseId::from_uuid(id)
                    }
                }
            }
        };

        sqlx::query("INSERT INTO booking (user_id, course_id, booked_at) VALUES ($1, $2, NOW())")
            .bind(user_id.as_uuid())
            .bind(course_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("booking_user_course_key")
                {
                    return StoreError::DuplicateBooking { user_id, course_id };
                }
                StoreError::Database(e)
            })?;

        tx.commit().await?;
        Ok(course_id)
    }

    async fn courses_for_user(&self, user_id: UserId) -> Result<Vec<BookedCourse>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.starts_at
            FROM booking b
            JOIN course c ON b.course_id = c.id
            WHERE b.user_id = $1
            ORDER BY c.starts_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(BookedCourse {
                    course_id: CourseId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    course_name: row.try_get("name")?,
                    starts_at: row.try_get("starts_at")?,
                })
            })
            .collect()
    }

    async fn cancel_booking(&self, user_id: UserId, course_id: CourseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM booking WHERE user_id = $1 AND course_id = $2")
            .bind(user_id.as_uuid())
            .bind(course_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
