//! Reservations repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use super::ReservationStore;
use crate::{
    error::{AppError, AppResult},
    models::reservation::{NewReservation, Reservation, ReservationRow, ReservationState},
};

const COLUMNS: &str = "id, start_date, end_date, room_number, observations, state, client_id";

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// A write naming a client that no longer exists is a missing client, not a database failure
fn missing_client(err: sqlx::Error) -> AppError {
    let foreign_key_violation = err
        .as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);

    if foreign_key_violation {
        AppError::NotFound("Client not found".to_string())
    } else {
        AppError::Database(err)
    }
}

fn into_reservations(rows: Vec<ReservationRow>) -> AppResult<Vec<Reservation>> {
    rows.into_iter().map(Reservation::try_from).collect()
}

#[derive(Clone)]
pub struct PgReservationsRepository {
    pool: Pool<Postgres>,
}

impl PgReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, condition: &str, value: i64) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE {} = $1 ORDER BY start_date, id",
            COLUMNS, condition
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        into_reservations(rows)
    }
}

#[async_trait]
impl ReservationStore for PgReservationsRepository {
    async fn insert(&self, reservation: &NewReservation) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            INSERT INTO reservations (start_date, end_date, room_number, observations, state, client_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.room_number)
        .bind(&reservation.observations)
        .bind(reservation.state.as_str())
        .bind(reservation.client_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(missing_client)?;

        tx.commit().await?;
        row.try_into()
    }

    async fn update(&self, reservation: &Reservation) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            UPDATE reservations
            SET start_date = $1, end_date = $2, room_number = $3,
                observations = $4, state = $5, client_id = $6
            WHERE id = $7
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(reservation.room_number)
        .bind(&reservation.observations)
        .bind(reservation.state.as_str())
        .bind(reservation.client_id)
        .bind(reservation.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(missing_client)?
        .ok_or_else(|| {
            AppError::NotFound(format!("Reservation not found with ID: {}", reservation.id))
        })?;

        tx.commit().await?;
        row.try_into()
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Reservation::try_from).transpose()
    }

    async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations ORDER BY start_date, id",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_reservations(rows)
    }

    async fn find_by_client(&self, client_id: i64) -> AppResult<Vec<Reservation>> {
        self.fetch_where("client_id", client_id).await
    }

    async fn find_by_room_number(&self, room_number: i32) -> AppResult<Vec<Reservation>> {
        self.fetch_where("room_number", i64::from(room_number)).await
    }

    async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            r#"
            SELECT {} FROM reservations
            WHERE start_date >= $1 AND end_date <= $2
            ORDER BY start_date, id
            "#,
            COLUMNS
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        into_reservations(rows)
    }

    async fn find_by_state(&self, state: ReservationState) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE state = $1 ORDER BY start_date, id",
            COLUMNS
        ))
        .bind(state.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_reservations(rows)
    }

    async fn count_overlapping(
        &self,
        room_number: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<i64>,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE room_number = $1
              AND state = $2
              AND start_date <= $4 AND end_date >= $3
              AND ($5::BIGINT IS NULL OR id <> $5)
            "#,
        )
        .bind(room_number)
        .bind(ReservationState::Confirmed.as_str())
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_state(&self, state: ReservationState) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE state = $1")
            .bind(state.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
