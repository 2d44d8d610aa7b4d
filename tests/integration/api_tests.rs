//! API integration tests

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;

use hotel_server::{api::create_router, repository::Repository, AppState};

fn app() -> Router {
    create_router(AppState::new(Repository::in_memory()))
}

fn days_ahead(days: i64) -> NaiveDate {
    Local::now().date_naive() + Duration::days(days)
}

/// Send a request and return the status with the parsed JSON body (Null when empty)
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_client(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/clients",
        Some(json!({
            "name": "Ana Ruiz",
            "email": email,
            "phone": "+34 600 123 456"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn book(app: &Router, client_id: i64, room: i32, start: i64, end: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/v1/reservations",
        Some(json!({
            "start_date": days_ahead(start),
            "end_date": days_ahead(end),
            "room_number": room,
            "client_id": client_id
        })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_and_get_client() {
    let app = app();
    let id = create_client(&app, "ana@example.com").await;

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/clients/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["reservations"], json!([]));
}

#[tokio::test]
async fn test_create_client_with_bad_email() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/clients",
        Some(json!({ "name": "Ana Ruiz", "email": "not-an-email", "phone": "600123456" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The email format is not valid");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = app();
    create_client(&app, "ana@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/clients",
        Some(json!({ "name": "Other", "email": "ana@example.com", "phone": "600123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/clients/email-availability?email=ana@example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn test_unknown_client_is_not_found() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/clients/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Client not found with ID: 42");
}

#[tokio::test]
async fn test_reservation_lifecycle_over_http() {
    let app = app();
    let client_id = create_client(&app, "ana@example.com").await;

    let (status, body) = book(&app, client_id, 101, 10, 12).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["state"], "CONFIRMED");
    assert_eq!(body["nights"], 2);
    assert_eq!(body["client"]["id"], client_id);
    let id = body["id"].as_i64().unwrap();

    // Confirmed reservations cannot be deleted
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/reservations/{}", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/reservations/{}/cancel", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "CANCELLED");

    // Cancelling twice is an illegal transition
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/reservations/{}/cancel", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Only confirmed reservations can be canceled");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/reservations/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/reservations/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overlapping_booking_is_conflict() {
    let app = app();
    let client_id = create_client(&app, "ana@example.com").await;

    let (status, _) = book(&app, client_id, 101, 10, 12).await;
    assert_eq!(status, StatusCode::CREATED);

    // Touching the check-out day still overlaps
    let (status, body) = book(&app, client_id, 101, 12, 14).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "RoomNotAvailable");
    assert_eq!(body["message"], "The room 101 is not available in the selected dates");

    // Another room is free
    let (status, _) = book(&app, client_id, 102, 12, 14).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_past_dates_are_rejected_at_the_boundary() {
    let app = app();
    let client_id = create_client(&app, "ana@example.com").await;

    let (status, body) = book(&app, client_id, 101, 0, 2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The start date must be in the future");
}

#[tokio::test]
async fn test_booking_for_unknown_client() {
    let app = app();

    let (status, body) = book(&app, 77, 101, 3, 4).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Client not found");
}

#[tokio::test]
async fn test_room_availability_endpoint() {
    let app = app();
    let client_id = create_client(&app, "ana@example.com").await;
    let (_, body) = book(&app, client_id, 101, 10, 12).await;
    let id = body["id"].as_i64().unwrap();

    let uri = format!(
        "/api/v1/rooms/101/availability?start_date={}&end_date={}",
        days_ahead(11),
        days_ahead(13)
    );
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, body) = send(&app, Method::GET, &format!("{}&exclude_id={}", uri, id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn test_inverted_availability_range_is_rejected() {
    let app = app();

    let uri = format!(
        "/api/v1/rooms/101/availability?start_date={}&end_date={}",
        days_ahead(5),
        days_ahead(3)
    );
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The start date cannot be after the end date");
}

#[tokio::test]
async fn test_update_cannot_revive_cancelled_reservation() {
    let app = app();
    let client_id = create_client(&app, "ana@example.com").await;
    let (_, body) = book(&app, client_id, 101, 10, 12).await;
    let id = body["id"].as_i64().unwrap();

    send(&app, Method::POST, &format!("/api/v1/reservations/{}/cancel", id), None).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/reservations/{}", id),
        Some(json!({
            "start_date": days_ahead(10),
            "end_date": days_ahead(12),
            "room_number": 101,
            "client_id": client_id,
            "state": "CONFIRMED"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, Method::GET, &format!("/api/v1/reservations/{}", id), None).await;
    assert_eq!(body["state"], "CANCELLED");
}

#[tokio::test]
async fn test_half_date_range_is_bad_request() {
    let app = app();

    let uri = format!("/api/v1/reservations?from={}", days_ahead(1));
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_client_removes_reservations() {
    let app = app();
    let client_id = create_client(&app, "ana@example.com").await;
    book(&app, client_id, 101, 5, 6).await;
    book(&app, client_id, 102, 5, 6).await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/clients/{}", client_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/api/v1/stats", None).await;
    assert_eq!(body["clients"], 0);
    assert_eq!(body["reservations"], 0);
}
