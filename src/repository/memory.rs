//! In-memory store used by tests and the `memory` storage backend

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{ClientStore, ReservationStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        client::{Client, NewClient},
        reservation::{NewReservation, Reservation, ReservationState},
    },
};

#[derive(Default)]
struct Tables {
    next_client_id: i64,
    next_reservation_id: i64,
    clients: BTreeMap<i64, Client>,
    reservations: BTreeMap<i64, Reservation>,
}

/// Volatile store implementing both client and reservation persistence
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn by_name(mut clients: Vec<Client>) -> Vec<Client> {
    clients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    clients
}

fn by_start_date(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
    reservations
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn insert(&self, client: &NewClient) -> AppResult<Client> {
        let mut tables = self.tables.write().await;
        if tables.clients.values().any(|c| c.email == client.email) {
            return Err(AppError::Conflict(format!(
                "There is already a client with the email: {}",
                client.email
            )));
        }

        tables.next_client_id += 1;
        let stored = Client {
            id: tables.next_client_id,
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
        };
        tables.clients.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i64, client: &NewClient) -> AppResult<Client> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .clients
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Client not found with ID: {}", id)))?;

        stored.name = client.name.clone();
        stored.email = client.email.clone();
        stored.phone = client.phone.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<Option<u64>> {
        let mut tables = self.tables.write().await;
        if tables.clients.remove(&id).is_none() {
            return Ok(None);
        }

        let before = tables.reservations.len();
        tables.reservations.retain(|_, r| r.client_id != id);
        Ok(Some((before - tables.reservations.len()) as u64))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Client>> {
        Ok(self.tables.read().await.clients.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables.clients.values().find(|c| c.email == email).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(by_name(
            tables
                .clients
                .values()
                .filter(|c| c.name.contains(name))
                .cloned()
                .collect(),
        ))
    }

    async fn find_all(&self) -> AppResult<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(by_name(tables.clients.values().cloned().collect()))
    }

    async fn exists_by_email(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .any(|c| c.email == email && Some(c.id) != exclude_id))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.clients.len() as i64)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert(&self, reservation: &NewReservation) -> AppResult<Reservation> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains_key(&reservation.client_id) {
            return Err(AppError::NotFound("Client not found".to_string()));
        }

        tables.next_reservation_id += 1;
        let stored = reservation.clone().into_reservation(tables.next_reservation_id);
        tables.reservations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, reservation: &Reservation) -> AppResult<Reservation> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains_key(&reservation.client_id) {
            return Err(AppError::NotFound("Client not found".to_string()));
        }

        let stored = tables.reservations.get_mut(&reservation.id).ok_or_else(|| {
            AppError::NotFound(format!("Reservation not found with ID: {}", reservation.id))
        })?;
        *stored = reservation.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables.write().await.reservations.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        Ok(self.tables.read().await.reservations.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        Ok(by_start_date(tables.reservations.values().cloned().collect()))
    }

    async fn find_by_client(&self, client_id: i64) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        Ok(by_start_date(
            tables
                .reservations
                .values()
                .filter(|r| r.client_id == client_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_room_number(&self, room_number: i32) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        Ok(by_start_date(
            tables
                .reservations
                .values()
                .filter(|r| r.room_number == room_number)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        Ok(by_start_date(
            tables
                .reservations
                .values()
                .filter(|r| r.start_date >= from && r.end_date <= to)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_state(&self, state: ReservationState) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        Ok(by_start_date(
            tables
                .reservations
                .values()
                .filter(|r| r.state == state)
                .cloned()
                .collect(),
        ))
    }

    async fn count_overlapping(
        &self,
        room_number: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<i64>,
    ) -> AppResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .reservations
            .values()
            .filter(|r| {
                r.room_number == room_number
                    && r.state == ReservationState::Confirmed
                    && Some(r.id) != exclude_id
                    && r.overlaps(start, end)
            })
            .count();
        Ok(count as i64)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables.read().await.reservations.len() as i64)
    }

    async fn count_by_state(&self, state: ReservationState) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.reservations.values().filter(|r| r.state == state).count() as i64)
    }
}
