//! Client management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        client::{Client, ClientDetails, ClientQuery, EmailAvailabilityQuery, NewClient},
        reservation::Reservation,
    },
};

/// Email availability answer
#[derive(Serialize, ToSchema)]
pub struct EmailAvailability {
    pub email: String,
    pub available: bool,
}

/// List or search clients
#[utoipa::path(
    get,
    path = "/clients",
    tag = "clients",
    params(ClientQuery),
    responses(
        (status = 200, description = "Clients ordered by name", body = Vec<Client>)
    )
)]
pub async fn list_clients(
    State(state): State<crate::AppState>,
    Query(query): Query<ClientQuery>,
) -> AppResult<Json<Vec<Client>>> {
    let clients = state.services.clients.list(&query).await?;
    Ok(Json(clients))
}

/// Get client details with reservations
#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "clients",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client details", body = ClientDetails),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ClientDetails>> {
    Ok(Json(state.services.clients.get_details(id).await?))
}

/// Create a new client
#[utoipa::path(
    post,
    path = "/clients",
    tag = "clients",
    request_body = NewClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid client data"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_client(
    State(state): State<crate::AppState>,
    Json(client): Json<NewClient>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let created = state.services.clients.create(client).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a client
#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "clients",
    params(("id" = i64, Path, description = "Client ID")),
    request_body = NewClient,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 400, description = "Invalid client data"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_client(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(client): Json<NewClient>,
) -> AppResult<Json<Client>> {
    Ok(Json(state.services.clients.update(id, client).await?))
}

/// Delete a client and all of its reservations
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "clients",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn delete_client(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.clients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reservations of a client
#[utoipa::path(
    get,
    path = "/clients/{id}/reservations",
    tag = "clients",
    params(("id" = i64, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client reservations", body = Vec<Reservation>),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client_reservations(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Reservation>>> {
    Ok(Json(state.services.reservations.list_for_client(id).await?))
}

/// Check whether an email can be used
#[utoipa::path(
    get,
    path = "/clients/email-availability",
    tag = "clients",
    params(EmailAvailabilityQuery),
    responses(
        (status = 200, description = "Email availability", body = EmailAvailability)
    )
)]
pub async fn email_availability(
    State(state): State<crate::AppState>,
    Query(query): Query<EmailAvailabilityQuery>,
) -> AppResult<Json<EmailAvailability>> {
    let available = state
        .services
        .clients
        .is_email_available(&query.email, query.exclude_id)
        .await?;

    Ok(Json(EmailAvailability {
        email: query.email,
        available,
    }))
}
