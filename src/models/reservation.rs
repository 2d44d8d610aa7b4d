//! Reservation model, lifecycle states and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::client::Client;
use crate::error::AppError;

// ---------------------------------------------------------------------------
// ReservationState
// ---------------------------------------------------------------------------

/// Reservation lifecycle state
///
/// Only `Confirmed -> Cancelled` is ever applied by the service layer.
/// `Completed` and `InProgress` are accepted and stored but no operation
/// produces them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    #[default]
    Confirmed,
    Cancelled,
    /// Check-out performed
    Completed,
    /// Check-in in progress
    InProgress,
}

impl ReservationState {
    pub const ALL: [ReservationState; 4] = [
        ReservationState::Confirmed,
        ReservationState::Cancelled,
        ReservationState::Completed,
        ReservationState::InProgress,
    ];

    /// Value stored in the `state` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Confirmed => "CONFIRMED",
            ReservationState::Cancelled => "CANCELLED",
            ReservationState::Completed => "COMPLETED",
            ReservationState::InProgress => "IN_PROGRESS",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReservationState::Confirmed => "Confirmed",
            ReservationState::Cancelled => "Cancelled",
            ReservationState::Completed => "Completed",
            ReservationState::InProgress => "In Progress",
        }
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for ReservationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CONFIRMED" => Ok(ReservationState::Confirmed),
            "CANCELLED" => Ok(ReservationState::Cancelled),
            "COMPLETED" => Ok(ReservationState::Completed),
            "IN_PROGRESS" => Ok(ReservationState::InProgress),
            _ => Err(format!("Invalid reservation state: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Reservation
// ---------------------------------------------------------------------------

/// Internal row structure for database queries (state as text)
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    room_number: i32,
    observations: Option<String>,
    state: String,
    client_id: i64,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            room_number: row.room_number,
            observations: row.observations,
            state: row.state.parse().map_err(AppError::Internal)?,
            client_id: row.client_id,
        })
    }
}

/// Stored room reservation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_number: i32,
    pub observations: Option<String>,
    pub state: ReservationState,
    /// Owning client
    pub client_id: i64,
}

impl Reservation {
    /// Number of nights; zero for a same-day reservation
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Closed-interval overlap: touching endpoints count
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// Confirmed and not started yet
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.state == ReservationState::Confirmed && self.start_date > today
    }

    /// Confirmed and `today` falls inside the stay
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.state == ReservationState::Confirmed
            && self.start_date <= today
            && today <= self.end_date
    }
}

impl PartialEq for Reservation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reservation {}

/// Validated reservation ready to be persisted
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_number: i32,
    pub observations: Option<String>,
    pub state: ReservationState,
    pub client_id: i64,
}

impl NewReservation {
    pub fn into_reservation(self, id: i64) -> Reservation {
        Reservation {
            id,
            start_date: self.start_date,
            end_date: self.end_date,
            room_number: self.room_number,
            observations: self.observations,
            state: self.state,
            client_id: self.client_id,
        }
    }
}

/// Create / update reservation request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ReservationRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "The room number must be greater than 0"))]
    pub room_number: Option<i32>,
    #[validate(length(max = 500, message = "The observations cannot exceed 500 characters"))]
    pub observations: Option<String>,
    /// Must be CONFIRMED (or absent) on create and equal to the stored state on update
    pub state: Option<ReservationState>,
    pub client_id: Option<i64>,
}

impl ReservationRequest {
    /// Dates submitted through the API must lie strictly after `today`
    pub fn ensure_future_dates(&self, today: NaiveDate) -> Result<(), AppError> {
        if matches!(self.start_date, Some(d) if d <= today) {
            return Err(AppError::Validation(
                "The start date must be in the future".to_string(),
            ));
        }
        if matches!(self.end_date, Some(d) if d <= today) {
            return Err(AppError::Validation(
                "The end date must be in the future".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reservation with its client attached
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub nights: i64,
    pub client: Client,
}

impl ReservationDetails {
    pub fn new(reservation: Reservation, client: Client) -> Self {
        Self {
            nights: reservation.nights(),
            reservation,
            client,
        }
    }
}

/// Reservation list filters (first present filter wins, in field order)
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReservationQuery {
    pub client_id: Option<i64>,
    pub room_number: Option<i32>,
    /// Range start; reservations must lie fully inside `[from, to]`
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub state: Option<ReservationState>,
}

/// Free-text reservation search
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Room number, or part of a client name
    pub q: Option<String>,
}

/// Room availability query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Reservation to ignore (when editing it)
    pub exclude_id: Option<i64>,
}

/// Room availability answer
#[derive(Debug, Serialize, ToSchema)]
pub struct Availability {
    pub room_number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub available: bool,
}
