//! Reservation lifecycle service

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::{
    availability::{AvailabilityChecker, RoomLocks},
    validation::validate_reservation,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        client::Client,
        reservation::{
            NewReservation, Reservation, ReservationDetails, ReservationQuery, ReservationRequest,
            ReservationState,
        },
    },
    repository::Repository,
};

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Booking counters
#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationStats {
    pub clients: i64,
    pub reservations: i64,
    /// Reservation count keyed by stored state (CONFIRMED, CANCELLED, ...)
    pub by_state: BTreeMap<String, i64>,
}

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    availability: AvailabilityChecker,
    room_locks: RoomLocks,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self {
            availability: AvailabilityChecker::new(repository.reservations.clone()),
            room_locks: RoomLocks::default(),
            repository,
        }
    }

    async fn resolve_client(&self, client_id: i64) -> AppResult<Client> {
        self.repository
            .clients
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
    }

    async fn ensure_available(&self, draft: &NewReservation, exclude_id: Option<i64>) -> AppResult<()> {
        let available = self
            .availability
            .is_available(draft.room_number, draft.start_date, draft.end_date, exclude_id)
            .await?;

        if !available {
            tracing::warn!(
                "Room {} already booked between {} and {}",
                draft.room_number, draft.start_date, draft.end_date
            );
            return Err(AppError::Conflict(format!(
                "The room {} is not available in the selected dates",
                draft.room_number
            )));
        }
        Ok(())
    }

    async fn get_reservation(&self, id: i64) -> AppResult<Reservation> {
        self.repository
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation not found with ID: {}", id)))
    }

    /// Create a reservation.
    ///
    /// Validates the request, attaches the client and checks the room is free
    /// before storing it. New reservations are always CONFIRMED.
    pub async fn create(&self, request: ReservationRequest) -> AppResult<ReservationDetails> {
        let draft = validate_reservation(&request, today())?;
        if let Some(state) = request.state.filter(|s| *s != ReservationState::Confirmed) {
            return Err(AppError::IllegalState(format!(
                "A new reservation cannot be created as {}",
                state
            )));
        }
        let client = self.resolve_client(draft.client_id).await?;

        let _room = self.room_locks.lock(draft.room_number).await;
        self.ensure_available(&draft, None).await?;
        let stored = self.repository.reservations.insert(&draft).await?;

        tracing::info!(
            "Reservation {} created: room {} from {} to {} for client {}",
            stored.id, stored.room_number, stored.start_date, stored.end_date, client.id
        );

        Ok(ReservationDetails::new(stored, client))
    }

    /// Update a reservation, ignoring the reservation itself in the availability check.
    ///
    /// The stored state is kept; a request naming another state is refused,
    /// since only `cancel` may move a reservation out of CONFIRMED.
    pub async fn update(&self, id: i64, request: ReservationRequest) -> AppResult<ReservationDetails> {
        let draft = validate_reservation(&request, today())?;

        let existing = self.get_reservation(id).await?;
        if request.state.is_some_and(|s| s != existing.state) {
            tracing::warn!(
                "Refusing to change reservation {} from {} through an update",
                id, existing.state
            );
            return Err(AppError::IllegalState(
                "The state of a reservation can only change by cancelling it".to_string(),
            ));
        }
        let client = self.resolve_client(draft.client_id).await?;

        let _room = self.room_locks.lock(draft.room_number).await;
        self.ensure_available(&draft, Some(id)).await?;

        let stored = self
            .repository
            .reservations
            .update(&NewReservation { state: existing.state, ..draft }.into_reservation(id))
            .await?;

        tracing::info!("Reservation {} updated", stored.id);

        Ok(ReservationDetails::new(stored, client))
    }

    /// Cancel a CONFIRMED reservation
    pub async fn cancel(&self, id: i64) -> AppResult<Reservation> {
        let mut reservation = self.get_reservation(id).await?;

        if reservation.state != ReservationState::Confirmed {
            tracing::warn!(
                "Refusing to cancel reservation {} in state {}",
                id, reservation.state
            );
            return Err(AppError::IllegalState(
                "Only confirmed reservations can be canceled".to_string(),
            ));
        }

        reservation.state = ReservationState::Cancelled;
        let stored = self.repository.reservations.update(&reservation).await?;

        tracing::info!("Reservation {} cancelled", id);
        Ok(stored)
    }

    /// Permanently delete a CANCELLED reservation
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let reservation = self.get_reservation(id).await?;

        if reservation.state != ReservationState::Cancelled {
            tracing::warn!(
                "Refusing to delete reservation {} in state {}",
                id, reservation.state
            );
            return Err(AppError::IllegalState(
                "Only canceled reservations can be deleted".to_string(),
            ));
        }

        if !self.repository.reservations.delete(id).await? {
            return Err(AppError::NotFound(format!("Reservation not found with ID: {}", id)));
        }

        tracing::info!("Reservation {} deleted", id);
        Ok(())
    }

    /// Get a reservation with its client
    pub async fn get_details(&self, id: i64) -> AppResult<ReservationDetails> {
        let reservation = self.get_reservation(id).await?;
        let client = self.resolve_client(reservation.client_id).await?;
        Ok(ReservationDetails::new(reservation, client))
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Reservation>> {
        self.repository.reservations.find_by_id(id).await
    }

    pub async fn find_all(&self) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.find_all().await
    }

    pub async fn find_by_client(&self, client_id: i64) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.find_by_client(client_id).await
    }

    /// Reservations of an existing client
    pub async fn list_for_client(&self, client_id: i64) -> AppResult<Vec<Reservation>> {
        self.resolve_client(client_id).await?;
        self.find_by_client(client_id).await
    }

    pub async fn find_by_room_number(&self, room_number: i32) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.find_by_room_number(room_number).await
    }

    /// Reservations lying fully inside `[from, to]`
    pub async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Reservation>> {
        if from > to {
            return Err(AppError::Validation(
                "The start date cannot be after the end date".to_string(),
            ));
        }
        self.repository.reservations.find_by_date_range(from, to).await
    }

    pub async fn find_by_state(&self, state: ReservationState) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.find_by_state(state).await
    }

    /// Confirmed reservations that have not started yet
    pub async fn find_active(&self) -> AppResult<Vec<Reservation>> {
        let today = today();
        let confirmed = self.find_by_state(ReservationState::Confirmed).await?;
        Ok(confirmed.into_iter().filter(|r| r.is_active(today)).collect())
    }

    /// Confirmed reservations whose stay includes today
    pub async fn find_current(&self) -> AppResult<Vec<Reservation>> {
        let today = today();
        let confirmed = self.find_by_state(ReservationState::Confirmed).await?;
        Ok(confirmed.into_iter().filter(|r| r.is_current(today)).collect())
    }

    /// Apply the first filter present in `query`, or list everything
    pub async fn list(&self, query: &ReservationQuery) -> AppResult<Vec<Reservation>> {
        if let Some(client_id) = query.client_id {
            return self.find_by_client(client_id).await;
        }
        if let Some(room_number) = query.room_number {
            return self.find_by_room_number(room_number).await;
        }
        match (query.from, query.to) {
            (Some(from), Some(to)) => return self.find_by_date_range(from, to).await,
            (None, None) => {}
            _ => {
                return Err(AppError::BadRequest(
                    "Both from and to are required for a date range".to_string(),
                ))
            }
        }
        if let Some(state) = query.state {
            return self.find_by_state(state).await;
        }
        self.find_all().await
    }

    /// Search by room number when `term` is numeric, otherwise by client name
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<Reservation>> {
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return self.find_all().await;
        }

        if let Ok(room_number) = term.parse::<i32>() {
            return self.find_by_room_number(room_number).await;
        }

        let mut found = Vec::new();
        for client in self.repository.clients.find_by_name(term).await? {
            found.extend(self.find_by_client(client.id).await?);
        }
        Ok(found)
    }

    /// Whether `room_number` is free between `start` and `end` (inclusive)
    pub async fn is_room_available(
        &self,
        room_number: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        if start > end {
            return Err(AppError::Validation(
                "The start date cannot be after the end date".to_string(),
            ));
        }
        self.availability
            .is_available(room_number, start, end, exclude_id)
            .await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.reservations.count().await
    }

    pub async fn count_by_state(&self, state: ReservationState) -> AppResult<i64> {
        self.repository.reservations.count_by_state(state).await
    }

    pub async fn stats(&self) -> AppResult<ReservationStats> {
        let mut by_state = BTreeMap::new();
        for state in ReservationState::ALL {
            by_state.insert(state.as_str().to_string(), self.count_by_state(state).await?);
        }

        Ok(ReservationStats {
            clients: self.repository.clients.count().await?,
            reservations: self.count().await?,
            by_state,
        })
    }
}
