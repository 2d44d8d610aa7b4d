//! Business validation of reservation candidates

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{NewReservation, ReservationRequest, ReservationState},
};

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Check a reservation candidate against the business rules.
///
/// Rules are evaluated in a fixed order and the first violation is reported:
/// dates present, start not after end, start not before `today`, a positive
/// room number, then a client reference. On success the candidate is
/// returned as a [`NewReservation`] in the CONFIRMED state; the requested
/// state is not a business rule and is checked by the lifecycle service.
pub fn validate_reservation(
    request: &ReservationRequest,
    today: NaiveDate,
) -> AppResult<NewReservation> {
    let start_date = request
        .start_date
        .ok_or_else(|| invalid("The start date is required"))?;

    let end_date = request
        .end_date
        .ok_or_else(|| invalid("The end date is required"))?;

    if start_date > end_date {
        return Err(invalid("The start date cannot be after the end date"));
    }

    if start_date < today {
        return Err(invalid("The start date cannot be before today"));
    }

    let room_number = request
        .room_number
        .filter(|n| *n > 0)
        .ok_or_else(|| invalid("The room number must be valid"))?;

    let client_id = request
        .client_id
        .ok_or_else(|| invalid("The client is required"))?;

    Ok(NewReservation {
        start_date,
        end_date,
        room_number,
        observations: request.observations.clone(),
        state: ReservationState::Confirmed,
        client_id,
    })
}
