//! The tool-call boundary speaks fixed phrases; downstream voice prompts
//! match them verbatim. These tests pin the exact wording.

use std::sync::Arc;

use frontdesk_booking::tools;
use frontdesk_booking::BookingService;
use frontdesk_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use frontdesk_notify::LogSink;

fn test_pool(dir: &tempfile::TempDir) -> DbPool {
    let db_path = dir.path().join("frontdesk.db");
    let pool = create_pool(
        db_path.to_str().expect("path should be valid UTF-8"),
        DbRuntimeSettings {
            busy_timeout_ms: 5_000,
            pool_max_size: 2,
        },
    )
    .expect("failed to create pool");
    {
        let conn = pool.get().expect("failed to get connection");
        run_migrations(&conn).expect("failed to run migrations");
    }
    pool
}

fn service(dir: &tempfile::TempDir) -> BookingService {
    BookingService::new(test_pool(dir), Arc::new(LogSink))
}

#[tokio::test]
async fn availability_phrases() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(&dir);

    assert_eq!(
        tools::check_availability(&svc, "2025-06-10", "09:00").await,
        "Yes, 2025-06-10 at 09:00 is available."
    );

    tools::book_appointment(
        &svc,
        "Asha",
        "+911234567890",
        "2025-06-10",
        "09:00",
        "checkup",
        "normal",
    )
    .await;

    assert_eq!(
        tools::check_availability(&svc, "2025-06-10", "09:00").await,
        "Sorry, 09:00 on 2025-06-10 is already booked."
    );
}

#[tokio::test]
async fn booking_conflict_phrases() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(&dir);

    let first = tools::book_appointment(
        &svc,
        "Asha",
        "+911234567890",
        "2025-06-10",
        "09:00",
        "checkup",
        "normal",
    )
    .await;
    assert_eq!(
        first,
        "Confirmed! Booked Asha for checkup on 2025-06-10 at 09:00. SMS sent."
    );

    let second = tools::book_appointment(
        &svc,
        "Ravi",
        "+919999999999",
        "2025-06-10",
        "09:00",
        "cleaning",
        "U2",
    )
    .await;
    assert_eq!(second, "Error: Slot just became unavailable.");
}

#[tokio::test]
async fn cancel_phrases() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(&dir);

    tools::book_appointment(
        &svc,
        "Asha",
        "+911234567890",
        "2025-06-10",
        "09:00",
        "checkup",
        "normal",
    )
    .await;

    assert_eq!(
        tools::cancel_appointment(&svc, "Asha", "+911234567890", "2025-06-10", "patient request")
            .await,
        "Confirmed. Your appointment on 2025-06-10 has been cancelled. Reason noted: patient request."
    );

    assert_eq!(
        tools::cancel_appointment(&svc, "Asha", "+911234567890", "2025-06-10", "again").await,
        "I couldn't find an appointment matching those details to cancel."
    );
}

#[tokio::test]
async fn reschedule_phrases() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let svc = service(&dir);

    // No prior booking at all.
    assert_eq!(
        tools::reschedule_appointment(
            &svc,
            "X",
            "+910000000000",
            "2099-01-01",
            "2099-01-02",
            "10:00"
        )
        .await,
        "I couldn't find an appointment for X on 2099-01-01."
    );

    tools::book_appointment(
        &svc,
        "Asha",
        "+911234567890",
        "2025-06-10",
        "09:00",
        "checkup",
        "normal",
    )
    .await;
    tools::book_appointment(
        &svc,
        "Ravi",
        "+919999999999",
        "2025-06-12",
        "14:00",
        "cleaning",
        "normal",
    )
    .await;

    assert_eq!(
        tools::reschedule_appointment(
            &svc,
            "Asha",
            "+911234567890",
            "2025-06-10",
            "2025-06-12",
            "14:00"
        )
        .await,
        "I'm sorry, 14:00 on 2025-06-12 is already taken."
    );

    assert_eq!(
        tools::reschedule_appointment(
            &svc,
            "Asha",
            "+911234567890",
            "2025-06-10",
            "2025-06-13",
            "10:00"
        )
        .await,
        "Success! The appointment for Asha has been moved to 2025-06-13 at 10:00."
    );
}

#[test]
fn doctor_message_phrase() {
    assert_eq!(
        tools::log_doctor_message("Asha", "wisdom tooth still aches at night"),
        "I have logged that message for the doctor. They will review it and we will get back to you if needed."
    );
}
