//! Locker reservation flow against the in-memory backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rocky_gym_core::{LockerId, LockerStatus};
use rocky_gym_integration_tests::locker_row;
use rocky_gym_storefront::services::{
    LockerCoordinator, LockerError, ReservationRequest, ReserveOutcome,
};
use rocky_gym_storefront::supabase::{Backend, BackendError, Filter, InMemoryBackend, TableOp};

async fn gym(rows: Vec<serde_json::Value>) -> (InMemoryBackend, LockerCoordinator) {
    let backend = InMemoryBackend::new();
    backend.seed("lockers", rows).await;
    let coordinator = LockerCoordinator::new(Arc::new(backend.clone()));
    (backend, coordinator)
}

fn ids(lockers: &[&rocky_gym_storefront::models::Locker]) -> Vec<i64> {
    lockers.iter().map(|l| l.id.as_i64()).collect()
}

#[tokio::test]
async fn test_confirmed_reservation_moves_locker_to_pending() {
    let (_, coordinator) = gym(vec![
        locker_row(1, "A1", "available"),
        locker_row(2, "A2", "available"),
    ])
    .await;
    let board = coordinator.list_lockers().await.unwrap();

    for id in [1, 2] {
        let locker = board.get(LockerId::new(id)).unwrap();
        let outcome = coordinator.reserve(locker, |_| true).await.unwrap();
        let ReserveOutcome::Reserved(reservation) = outcome else {
            panic!("expected locker {id} to be reserved");
        };
        assert_eq!(reservation.locker.status, LockerStatus::Pending);
        assert!(!reservation.locker.available);
        assert!(!ids(&reservation.board.available()).contains(&id));
        assert!(ids(&reservation.board.taken()).contains(&id));
    }
}

#[tokio::test]
async fn test_pending_locker_asks_for_staff_and_writes_nothing() {
    let (backend, coordinator) = gym(vec![locker_row(4, "B1", "pending")]).await;
    let before = coordinator.list_lockers().await.unwrap();
    let locker = before.get(LockerId::new(4)).unwrap().clone();

    let mut asked = false;
    let err = coordinator
        .reserve(&locker, |_| {
            asked = true;
            true
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LockerError::AwaitingStaff { ref number } if number == "B1"));
    assert!(err.to_string().contains("contact the gym staff"));
    assert!(!asked);
    assert_eq!(coordinator.list_lockers().await.unwrap(), before);
    assert_eq!(backend.rows("lockers").await, vec![locker_row(4, "B1", "pending")]);
}

#[tokio::test]
async fn test_booked_locker_is_ignored() {
    let (backend, coordinator) = gym(vec![locker_row(2, "A2", "booked")]).await;
    let locker = coordinator.get_locker(LockerId::new(2)).await.unwrap();

    let mut asked = false;
    let outcome = coordinator
        .reserve(&locker, |_| {
            asked = true;
            true
        })
        .await
        .unwrap();

    assert_eq!(outcome, ReserveOutcome::Ignored);
    assert!(!asked);
    assert_eq!(backend.rows("lockers").await, vec![locker_row(2, "A2", "booked")]);
}

#[tokio::test]
async fn test_declined_prompt_writes_nothing() {
    let (backend, coordinator) = gym(vec![locker_row(1, "A1", "available")]).await;
    let locker = coordinator.get_locker(LockerId::new(1)).await.unwrap();

    let outcome = coordinator.reserve(&locker, |_| false).await.unwrap();

    assert_eq!(outcome, ReserveOutcome::Cancelled);
    assert_eq!(backend.rows("lockers").await, vec![locker_row(1, "A1", "available")]);
}

#[tokio::test]
async fn test_list_is_ordered_by_id_regardless_of_insertion() {
    let (_, coordinator) = gym(vec![
        locker_row(9, "C3", "available"),
        locker_row(2, "A2", "booked"),
        locker_row(5, "B2", "pending"),
        locker_row(1, "A1", "available"),
    ])
    .await;

    let board = coordinator.list_lockers().await.unwrap();
    let order: Vec<i64> = board.lockers().iter().map(|l| l.id.as_i64()).collect();
    assert_eq!(order, vec![1, 2, 5, 9]);
}

#[tokio::test]
async fn test_reserving_b3_scenario() {
    let (backend, coordinator) = gym(vec![
        locker_row(6, "B2", "available"),
        locker_row(7, "B3", "available"),
    ])
    .await;
    let board = coordinator.list_lockers().await.unwrap();
    let b3 = board.get(LockerId::new(7)).unwrap();

    coordinator.reserve(b3, |_| true).await.unwrap();

    let stored = backend
        .rows("lockers")
        .await
        .into_iter()
        .find(|row| row["id"] == 7)
        .unwrap();
    assert_eq!(stored, locker_row(7, "B3", "pending"));
    assert_eq!(
        serde_json::json!({"id": 7, "number": "B3", "available": false, "status": "pending"}),
        stored
    );

    let refreshed = coordinator.list_lockers().await.unwrap();
    assert_eq!(ids(&refreshed.available()), vec![6]);
    assert_eq!(ids(&refreshed.taken()), vec![7]);
}

#[tokio::test]
async fn test_concurrent_confirmations_have_one_winner() {
    let (backend, coordinator) = gym(vec![locker_row(3, "A3", "available")]).await;
    let locker = coordinator.get_locker(LockerId::new(3)).await.unwrap();

    // Both members saw the locker as available.
    let first = ReservationRequest::for_locker(&locker).unwrap().unwrap();
    let second = ReservationRequest::for_locker(&locker).unwrap().unwrap();

    let (a, b) = tokio::join!(coordinator.confirm(first), coordinator.confirm(second));

    let results = [a, b];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(LockerError::JustTaken { number }) if number == "A3"
    )));
    assert_eq!(backend.rows("lockers").await, vec![locker_row(3, "A3", "pending")]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_board() {
    let (backend, coordinator) = gym(vec![locker_row(1, "A1", "available")]).await;
    let before = coordinator.list_lockers().await.unwrap();

    backend.set_unavailable(true).await;
    assert!(matches!(
        coordinator.list_lockers().await,
        Err(LockerError::Backend(_))
    ));
    assert_eq!(coordinator.snapshot().await, before);

    backend.set_unavailable(false).await;
    assert_eq!(coordinator.list_lockers().await.unwrap(), before);
}

#[tokio::test]
async fn test_stale_view_of_taken_locker_is_rejected() {
    let (backend, coordinator) = gym(vec![locker_row(1, "A1", "available")]).await;
    let seen = coordinator.get_locker(LockerId::new(1)).await.unwrap();

    // Someone else got there first.
    backend
        .update(
            "lockers",
            &Filter::eq("id", 1),
            serde_json::json!({"available": false, "status": "pending"}),
        )
        .await
        .unwrap();

    let err = coordinator.reserve(&seen, |_| true).await.unwrap_err();
    assert!(matches!(err, LockerError::JustTaken { .. }));
}

#[tokio::test]
async fn test_failed_reservation_write_is_not_retried() {
    let (backend, coordinator) = gym(vec![locker_row(1, "A1", "available")]).await;
    let board = coordinator.list_lockers().await.unwrap();

    backend.fail_on(TableOp::Update, "lockers").await;
    let err = coordinator
        .reserve(board.get(LockerId::new(1)).unwrap(), |_| true)
        .await
        .unwrap_err();
    assert!(matches!(err, LockerError::Backend(BackendError::Rejected { .. })));
    assert_eq!(backend.rows("lockers").await, vec![locker_row(1, "A1", "available")]);

    // Trying again after recovery works.
    backend.clear_failure(TableOp::Update, "lockers").await;
    let outcome = coordinator
        .reserve(board.get(LockerId::new(1)).unwrap(), |_| true)
        .await
        .unwrap();
    assert!(matches!(outcome, ReserveOutcome::Reserved(_)));
}

#[tokio::test]
async fn test_reservation_survives_failed_refresh() {
    let (backend, coordinator) = gym(vec![
        locker_row(1, "A1", "available"),
        locker_row(2, "A2", "available"),
    ])
    .await;
    let before = coordinator.list_lockers().await.unwrap();

    backend.fail_on(TableOp::Select, "lockers").await;
    let outcome = coordinator
        .reserve(before.get(LockerId::new(2)).unwrap(), |_| true)
        .await
        .unwrap();
    let ReserveOutcome::Reserved(reservation) = outcome else {
        panic!("expected locker 2 to be reserved");
    };

    assert_eq!(reservation.locker.status, LockerStatus::Pending);
    assert_eq!(reservation.board, before);
    assert_eq!(
        backend.rows("lockers").await,
        vec![locker_row(1, "A1", "available"), locker_row(2, "A2", "pending")]
    );
}
