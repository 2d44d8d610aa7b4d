//! Reservation management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::reservation::{
        Availability, AvailabilityQuery, Reservation, ReservationDetails, ReservationQuery,
        ReservationRequest, SearchQuery,
    },
    services::reservations::{today, ReservationStats},
};

/// Request-boundary checks applied before the business rules
fn check_request(request: &ReservationRequest) -> AppResult<()> {
    request.validate()?;
    request.ensure_future_dates(today())
}

/// List reservations, optionally filtered
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    params(ReservationQuery),
    responses(
        (status = 200, description = "Reservations ordered by start date", body = Vec<Reservation>),
        (status = 400, description = "Incomplete date range")
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.reservations.list(&query).await?;
    Ok(Json(reservations))
}

/// Confirmed reservations that have not started yet
#[utoipa::path(
    get,
    path = "/reservations/active",
    tag = "reservations",
    responses(
        (status = 200, description = "Upcoming reservations", body = Vec<Reservation>)
    )
)]
pub async fn list_active(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Reservation>>> {
    Ok(Json(state.services.reservations.find_active().await?))
}

/// Confirmed reservations whose stay includes today
#[utoipa::path(
    get,
    path = "/reservations/current",
    tag = "reservations",
    responses(
        (status = 200, description = "Ongoing reservations", body = Vec<Reservation>)
    )
)]
pub async fn list_current(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Reservation>>> {
    Ok(Json(state.services.reservations.find_current().await?))
}

/// Search reservations by room number or client name
#[utoipa::path(
    get,
    path = "/reservations/search",
    tag = "reservations",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching reservations", body = Vec<Reservation>)
    )
)]
pub async fn search_reservations(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state
        .services
        .reservations
        .search(query.q.as_deref())
        .await?;
    Ok(Json(reservations))
}

/// Get reservation details by ID
#[utoipa::path(
    get,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ReservationDetails),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetails>> {
    Ok(Json(state.services.reservations.get_details(id).await?))
}

/// Book a room
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 400, description = "Invalid reservation"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Room not available")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    Json(request): Json<ReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationDetails>)> {
    check_request(&request)?;
    let reservation = state.services.reservations.create(request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Update a reservation
#[utoipa::path(
    put,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationDetails),
        (status = 400, description = "Invalid reservation"),
        (status = 404, description = "Reservation or client not found"),
        (status = 409, description = "Room not available"),
        (status = 422, description = "Requested state differs from the stored one")
    )
)]
pub async fn update_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ReservationRequest>,
) -> AppResult<Json<ReservationDetails>> {
    check_request(&request)?;
    let reservation = state.services.reservations.update(id, request).await?;
    Ok(Json(reservation))
}

/// Cancel a confirmed reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is not confirmed")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(state.services.reservations.cancel(id).await?))
}

/// Delete a cancelled reservation
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 204, description = "Reservation deleted"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is not cancelled")
    )
)]
pub async fn delete_reservation(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.reservations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check whether a room is free for a date range
#[utoipa::path(
    get,
    path = "/rooms/{room_number}/availability",
    tag = "reservations",
    params(
        ("room_number" = i32, Path, description = "Room number"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Availability of the room", body = Availability),
        (status = 400, description = "Start date after end date")
    )
)]
pub async fn room_availability(
    State(state): State<crate::AppState>,
    Path(room_number): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Availability>> {
    let available = state
        .services
        .reservations
        .is_room_available(room_number, query.start_date, query.end_date, query.exclude_id)
        .await?;

    Ok(Json(Availability {
        room_number,
        start_date: query.start_date,
        end_date: query.end_date,
        available,
    }))
}

/// Client and reservation counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Counters", body = ReservationStats)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<ReservationStats>> {
    Ok(Json(state.services.reservations.stats().await?))
}
