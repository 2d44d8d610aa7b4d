//! Clients repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::ClientStore;
use crate::{
    error::{AppError, AppResult},
    models::client::{Client, NewClient},
};

const UNIQUE_VIOLATION: &str = "23505";

/// Turn a unique-email violation into a conflict, keep other errors as database errors
fn email_conflict(err: sqlx::Error, email: &str) -> AppError {
    let unique_violation = err
        .as_database_error()
        .and_then(|e| e.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);

    if unique_violation {
        AppError::Conflict(format!("There is already a client with the email: {}", email))
    } else {
        AppError::Database(err)
    }
}

#[derive(Clone)]
pub struct PgClientsRepository {
    pool: Pool<Postgres>,
}

impl PgClientsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientsRepository {
    async fn insert(&self, client: &NewClient) -> AppResult<Client> {
        let row = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, phone
            "#,
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &client.email))?;
        Ok(row)
    }

    async fn update(&self, id: i64, client: &NewClient) -> AppResult<Client> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET name = $1, email = $2, phone = $3
            WHERE id = $4
            RETURNING id, name, email, phone
            "#,
        )
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &client.email))?
        .ok_or_else(|| AppError::NotFound(format!("Client not found with ID: {}", id)))
    }

    async fn delete(&self, id: i64) -> AppResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        // Row lock makes concurrent bookings for this client wait on the outcome
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM clients WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if found.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM reservations WHERE client_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(removed))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, phone FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, phone FROM clients WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, phone FROM clients WHERE name LIKE $1 ORDER BY name",
        )
        .bind(format!("%{}%", name))
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    async fn find_all(&self) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, phone FROM clients ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    async fn exists_by_email(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM clients
                WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
