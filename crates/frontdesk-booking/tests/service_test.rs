use std::sync::Arc;
use std::time::Duration;

use frontdesk_booking::{BookingError, BookingRequest, BookingService, Urgency};
use frontdesk_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use frontdesk_notify::LogSink;

/// Creates a file-backed pool so every pooled connection sees the same
/// database, which concurrent-booking tests depend on.
fn test_pool(dir: &tempfile::TempDir, max_size: u32) -> DbPool {
    let db_path = dir.path().join("frontdesk.db");
    let pool = create_pool(
        db_path.to_str().expect("path should be valid UTF-8"),
        DbRuntimeSettings {
            busy_timeout_ms: 5_000,
            pool_max_size: max_size,
        },
    )
    .expect("failed to create pool");
    {
        let conn = pool.get().expect("failed to get connection");
        run_migrations(&conn).expect("failed to run migrations");
    }
    pool
}

fn service(pool: DbPool) -> BookingService {
    BookingService::new(pool, Arc::new(LogSink))
}

fn request(name: &str, phone: &str, date: &str, time: &str) -> BookingRequest {
    BookingRequest {
        patient_name: name.to_string(),
        phone: phone.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        reason: "checkup".to_string(),
        urgency: Urgency::Normal,
    }
}

#[tokio::test]
async fn book_cancel_round_trip() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(test_pool(&dir, 4));

    svc.book(request("Asha", "+911234567890", "2025-06-10", "09:00"))
        .await
        .expect("booking should succeed");

    assert!(
        !svc.check_availability("2025-06-10", "09:00")
            .await
            .expect("availability check should succeed"),
        "booked slot must read as occupied"
    );

    svc.cancel("Asha", "+911234567890", "2025-06-10", "patient request")
        .await
        .expect("cancel should succeed");

    assert!(
        svc.check_availability("2025-06-10", "09:00")
            .await
            .expect("availability check should succeed"),
        "cancelled slot must read as free"
    );
}

#[tokio::test]
async fn concurrent_bookings_have_exactly_one_winner() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(test_pool(&dir, 8));

    let mut handles = Vec::new();
    for i in 0..8 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.book(request(
                &format!("Caller {i}"),
                &format!("+91000000000{i}"),
                "2025-06-10",
                "09:00",
            ))
            .await
        }));
    }

    let mut booked = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task should not panic") {
            Ok(_) => booked += 1,
            Err(BookingError::SlotConflict) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(booked, 1, "exactly one booking must win the slot");
    assert_eq!(conflicts, 7, "every loser must observe a conflict");
}

#[tokio::test]
async fn validation_rejects_before_store_access() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let pool = test_pool(&dir, 2);
    let svc = service(pool.clone());

    for req in [
        request("", "+911234567890", "2025-06-10", "09:00"),
        request("Asha", "", "2025-06-10", "09:00"),
        request("Asha", "+911234567890", "10-06-2025", "09:00"),
        request("Asha", "+911234567890", "2025-06-10", "9am"),
    ] {
        let err = svc.book(req).await.expect_err("should be rejected");
        assert!(matches!(err, BookingError::Validation(_)));
    }

    // Nothing may have reached the store.
    let conn = pool.get().expect("failed to get connection");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
        .expect("count query should succeed");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn reschedule_and_booking_contend_for_one_slot() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(test_pool(&dir, 4));

    svc.book(request("Asha", "+911234567890", "2025-06-10", "09:00"))
        .await
        .expect("initial booking should succeed");

    // The reschedule claims the target slot; a later booking must lose it.
    svc.reschedule("Asha", "+911234567890", "2025-06-10", "2025-06-12", "14:00")
        .await
        .expect("reschedule should succeed");

    let err = svc
        .book(request("Ravi", "+919999999999", "2025-06-12", "14:00"))
        .await
        .expect_err("slot is already claimed by the reschedule");
    assert!(matches!(err, BookingError::SlotConflict));

    // And the mirror image: when a booking wins the slot first, the
    // reschedule observes the conflict.
    svc.book(request("Meera", "+911111111111", "2025-07-01", "10:00"))
        .await
        .expect("booking should succeed");
    svc.book(request("Dev", "+912222222222", "2025-07-02", "11:00"))
        .await
        .expect("booking should succeed");

    let err = svc
        .reschedule("Meera", "+911111111111", "2025-07-01", "2025-07-02", "11:00")
        .await
        .expect_err("target slot is already booked");
    assert!(matches!(err, BookingError::SlotConflict));
}

#[tokio::test]
async fn exhausted_pool_surfaces_as_timeout() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let pool = test_pool(&dir, 1);
    let svc = service(pool.clone()).with_op_timeout(Duration::from_millis(100));

    // Hold the pool's only connection so the store call cannot acquire one
    // before the operation deadline expires.
    let _held = pool.get().expect("failed to get connection");

    let err = svc
        .check_availability("2025-06-10", "09:00")
        .await
        .expect_err("operation should time out");
    assert!(matches!(err, BookingError::Timeout));
    assert!(err.is_store_error());
}
