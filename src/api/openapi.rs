//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{clients, health, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hotel API",
        version = "1.0.0",
        description = "Hotel clients and room reservations REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Clients
        clients::list_clients,
        clients::get_client,
        clients::create_client,
        clients::update_client,
        clients::delete_client,
        clients::get_client_reservations,
        clients::email_availability,
        // Reservations
        reservations::list_reservations,
        reservations::list_active,
        reservations::list_current,
        reservations::search_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::update_reservation,
        reservations::cancel_reservation,
        reservations::delete_reservation,
        reservations::room_availability,
        // Stats
        reservations::get_stats,
    ),
    components(
        schemas(
            // Clients
            crate::models::client::Client,
            crate::models::client::NewClient,
            crate::models::client::ClientDetails,
            clients::EmailAvailability,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationState,
            crate::models::reservation::ReservationRequest,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::Availability,
            // Stats
            crate::services::reservations::ReservationStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "clients", description = "Client management"),
        (name = "reservations", description = "Reservation management"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
