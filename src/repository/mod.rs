//! Repository layer: store traits and their PostgreSQL / in-memory implementations

pub mod clients;
pub mod memory;
pub mod reservations;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        client::{Client, NewClient},
        reservation::{NewReservation, Reservation, ReservationState},
    },
};

/// Persistence operations on clients
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn insert(&self, client: &NewClient) -> AppResult<Client>;

    /// Fails with `NotFound` when the client does not exist
    async fn update(&self, id: i64, client: &NewClient) -> AppResult<Client>;

    /// Atomically removes the client and all of its reservations.
    ///
    /// Returns how many reservations went with it, or `None` when the client
    /// does not exist.
    async fn delete(&self, id: i64) -> AppResult<Option<u64>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Client>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>>;

    /// Partial, case-sensitive name match, ordered by name
    async fn find_by_name(&self, name: &str) -> AppResult<Vec<Client>>;

    /// All clients ordered by name
    async fn find_all(&self) -> AppResult<Vec<Client>>;

    /// Whether a client other than `exclude_id` owns `email`
    async fn exists_by_email(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool>;

    async fn count(&self) -> AppResult<i64>;
}

/// Persistence operations on reservations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert(&self, reservation: &NewReservation) -> AppResult<Reservation>;

    /// Full replacement of a stored reservation; `NotFound` when absent
    async fn update(&self, reservation: &Reservation) -> AppResult<Reservation>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>>;

    /// All reservations ordered by start date
    async fn find_all(&self) -> AppResult<Vec<Reservation>>;

    async fn find_by_client(&self, client_id: i64) -> AppResult<Vec<Reservation>>;

    async fn find_by_room_number(&self, room_number: i32) -> AppResult<Vec<Reservation>>;

    /// Reservations lying fully inside `[from, to]`
    async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Reservation>>;

    async fn find_by_state(&self, state: ReservationState) -> AppResult<Vec<Reservation>>;

    /// Number of CONFIRMED reservations of `room_number` overlapping the closed
    /// interval `[start, end]`, ignoring `exclude_id`
    async fn count_overlapping(
        &self,
        room_number: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<i64>,
    ) -> AppResult<i64>;

    async fn count(&self) -> AppResult<i64>;

    async fn count_by_state(&self, state: ReservationState) -> AppResult<i64>;
}

/// Main repository struct holding the stores
#[derive(Clone)]
pub struct Repository {
    pub clients: Arc<dyn ClientStore>,
    pub reservations: Arc<dyn ReservationStore>,
}

impl Repository {
    /// Create a repository backed by PostgreSQL
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            clients: Arc::new(clients::PgClientsRepository::new(pool.clone())),
            reservations: Arc::new(reservations::PgReservationsRepository::new(pool)),
        }
    }

    /// Create a repository backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            clients: store.clone(),
            reservations: store,
        }
    }

    pub fn from_stores(
        clients: Arc<dyn ClientStore>,
        reservations: Arc<dyn ReservationStore>,
    ) -> Self {
        Self { clients, reservations }
    }
}
