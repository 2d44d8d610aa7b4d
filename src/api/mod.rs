//! API handlers for the hotel REST endpoints

pub mod clients;
pub mod health;
pub mod openapi;
pub mod reservations;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Clients
        .route("/clients", get(clients::list_clients).post(clients::create_client))
        .route("/clients/email-availability", get(clients::email_availability))
        .route(
            "/clients/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/clients/:id/reservations", get(clients::get_client_reservations))
        // Reservations
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/reservations/active", get(reservations::list_active))
        .route("/reservations/current", get(reservations::list_current))
        .route("/reservations/search", get(reservations::search_reservations))
        .route(
            "/reservations/:id",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route("/reservations/:id/cancel", post(reservations::cancel_reservation))
        // Rooms
        .route(
            "/rooms/:room_number/availability",
            get(reservations::room_availability),
        )
        // Statistics
        .route("/stats", get(reservations::get_stats))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
