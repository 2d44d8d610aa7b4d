//! Reservation lifecycle tests through the service layer

use chrono::{Duration, Local, NaiveDate};
use tokio_test::{assert_err, assert_ok};

use hotel_server::{
    models::{
        client::NewClient,
        reservation::{ReservationRequest, ReservationState},
    },
    repository::Repository,
    services::Services,
    AppError,
};

fn days_ahead(days: i64) -> NaiveDate {
    Local::now().date_naive() + Duration::days(days)
}

fn request(client_id: i64, room: i32, start: i64, end: i64) -> ReservationRequest {
    ReservationRequest {
        start_date: Some(days_ahead(start)),
        end_date: Some(days_ahead(end)),
        room_number: Some(room),
        client_id: Some(client_id),
        ..Default::default()
    }
}

async fn setup() -> (Services, i64) {
    let services = Services::new(Repository::in_memory());
    let client = services
        .clients
        .create(NewClient {
            name: "Ana Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            phone: "600123456".to_string(),
        })
        .await
        .unwrap();
    (services, client.id)
}

#[tokio::test]
async fn test_create_cancel_delete_round_trip() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    let created = reservations.create(request(client_id, 101, 1, 3)).await.unwrap();
    assert_eq!(created.reservation.state, ReservationState::Confirmed);

    let cancelled = reservations.cancel(created.reservation.id).await.unwrap();
    assert_eq!(cancelled.state, ReservationState::Cancelled);

    assert_ok!(reservations.delete(created.reservation.id).await);
    assert!(reservations
        .find_by_id(created.reservation.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_zero_night_reservation_is_allowed() {
    let (services, client_id) = setup().await;

    let created = services
        .reservations
        .create(request(client_id, 101, 2, 2))
        .await
        .unwrap();
    assert_eq!(created.nights, 0);
}

#[tokio::test]
async fn test_touching_endpoints_conflict() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    assert_ok!(reservations.create(request(client_id, 101, 3, 5)).await);

    let err = reservations
        .create(request(client_id, 101, 5, 7))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = reservations
        .create(request(client_id, 101, 1, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert_ok!(reservations.create(request(client_id, 101, 6, 8)).await);
}

#[tokio::test]
async fn test_cancelled_reservation_frees_the_room() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    let first = reservations.create(request(client_id, 101, 3, 5)).await.unwrap();
    reservations.cancel(first.reservation.id).await.unwrap();

    assert_ok!(reservations.create(request(client_id, 101, 3, 5)).await);
}

#[tokio::test]
async fn test_update_ignores_its_own_dates() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    let created = reservations.create(request(client_id, 101, 3, 5)).await.unwrap();

    let updated = reservations
        .update(created.reservation.id, request(client_id, 101, 4, 6))
        .await
        .unwrap();
    assert_eq!(updated.reservation.start_date, days_ahead(4));
    assert_eq!(updated.reservation.state, ReservationState::Confirmed);
}

#[tokio::test]
async fn test_lifecycle_transitions_are_guarded() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    let created = reservations.create(request(client_id, 101, 3, 5)).await.unwrap();
    let id = created.reservation.id;

    let err = reservations.delete(id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalState(_)));

    reservations.cancel(id).await.unwrap();
    let err = reservations.cancel(id).await.unwrap_err();
    assert!(matches!(err, AppError::IllegalState(_)));

    let err = reservations.cancel(999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Reservation not found with ID: 999"));
}

#[tokio::test]
async fn test_deleting_client_cascades() {
    let (services, client_id) = setup().await;

    services.reservations.create(request(client_id, 101, 3, 5)).await.unwrap();
    services.reservations.create(request(client_id, 102, 3, 5)).await.unwrap();

    assert_ok!(services.clients.delete(client_id).await);
    assert_eq!(services.reservations.count().await.unwrap(), 0);
    assert_err!(services.clients.get_by_id(client_id).await);
}

#[tokio::test]
async fn test_concurrent_bookings_of_same_room_one_wins() {
    let (services, client_id) = setup().await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let services = services.clone();
            tokio::spawn(async move {
                services.reservations.create(request(client_id, 101, 3, 5)).await
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn test_active_and_current_views() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    reservations.create(request(client_id, 101, 0, 2)).await.unwrap();
    reservations.create(request(client_id, 102, 4, 6)).await.unwrap();

    let active = reservations.find_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].room_number, 102);

    let current = reservations.find_current().await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].room_number, 101);
}

#[tokio::test]
async fn test_search_by_room_or_client_name() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    reservations.create(request(client_id, 101, 3, 5)).await.unwrap();
    reservations.create(request(client_id, 205, 3, 5)).await.unwrap();

    assert_eq!(reservations.search(Some("205")).await.unwrap().len(), 1);
    assert_eq!(reservations.search(Some("Ana")).await.unwrap().len(), 2);
    assert_eq!(reservations.search(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_created_reservation_reads_back_unchanged() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    let request = ReservationRequest {
        observations: Some("Crib in the room".to_string()),
        ..request(client_id, 101, 3, 5)
    };
    let created = reservations.create(request).await.unwrap();

    let found = reservations
        .find_by_id(created.reservation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.start_date, days_ahead(3));
    assert_eq!(found.end_date, days_ahead(5));
    assert_eq!(found.room_number, 101);
    assert_eq!(found.observations.as_deref(), Some("Crib in the room"));
    assert_eq!(found.state, ReservationState::Confirmed);
    assert_eq!(found.client_id, client_id);
}

#[tokio::test]
async fn test_update_onto_another_booking_conflicts() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    reservations.create(request(client_id, 101, 3, 5)).await.unwrap();
    let second = reservations.create(request(client_id, 101, 10, 12)).await.unwrap();

    let err = reservations
        .update(second.reservation.id, request(client_id, 101, 4, 6))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let unchanged = reservations
        .find_by_id(second.reservation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.start_date, days_ahead(10));
}

#[tokio::test]
async fn test_availability_flips_after_booking() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    assert!(reservations
        .is_room_available(101, days_ahead(3), days_ahead(5), None)
        .await
        .unwrap());

    reservations.create(request(client_id, 101, 3, 5)).await.unwrap();

    assert!(!reservations
        .is_room_available(101, days_ahead(3), days_ahead(5), None)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_cannot_change_state() {
    let (services, client_id) = setup().await;
    let reservations = &services.reservations;

    let created = reservations.create(request(client_id, 101, 3, 5)).await.unwrap();
    let id = created.reservation.id;
    reservations.cancel(id).await.unwrap();

    let revive = ReservationRequest {
        state: Some(ReservationState::Confirmed),
        ..request(client_id, 101, 3, 5)
    };
    assert!(matches!(
        reservations.update(id, revive).await,
        Err(AppError::IllegalState(_))
    ));

    // Leaving the state out keeps the stored one
    let updated = reservations.update(id, request(client_id, 101, 4, 6)).await.unwrap();
    assert_eq!(updated.reservation.state, ReservationState::Cancelled);
}

#[tokio::test]
async fn test_client_delete_racing_with_bookings_leaves_no_orphans() {
    let (services, client_id) = setup().await;
    for room in 1..=3 {
        services.reservations.create(request(client_id, room, 3, 5)).await.unwrap();
    }

    let bookings: Vec<_> = (10..20)
        .map(|room| {
            let services = services.clone();
            tokio::spawn(async move {
                services.reservations.create(request(client_id, room, 3, 5)).await
            })
        })
        .collect();
    let deletion = {
        let services = services.clone();
        tokio::spawn(async move { services.clients.delete(client_id).await })
    };

    assert_ok!(deletion.await.unwrap());
    for booking in bookings {
        if let Err(e) = booking.await.unwrap() {
            assert!(matches!(e, AppError::NotFound(_)), "unexpected error: {}", e);
        }
    }

    assert!(services.clients.find_by_id(client_id).await.unwrap().is_none());
    assert!(services.reservations.find_by_client(client_id).await.unwrap().is_empty());
}
