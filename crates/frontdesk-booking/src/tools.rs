//! Tool-call boundary.
//!
//! The external dialog orchestrator drives the booking core through these
//! functions: string-typed arguments in, one short phrase out. The phrases
//! are fixed wire format — downstream voice prompts and regression suites
//! match them verbatim, so they must not be reworded.

use crate::error::BookingError;
use crate::model::Urgency;
use crate::service::{BookingRequest, BookingService};

/// Checks whether a slot is free.
pub async fn check_availability(service: &BookingService, date: &str, time: &str) -> String {
    match service.check_availability(date, time).await {
        Ok(true) => format!("Yes, {date} at {time} is available."),
        Ok(false) => format!("Sorry, {time} on {date} is already booked."),
        Err(BookingError::Validation(msg)) => format!("Error: {msg}"),
        Err(e) => {
            tracing::error!(error = %e, "availability check failed");
            "Sorry, I couldn't check that slot right now.".to_string()
        }
    }
}

/// Books an appointment and reports the outcome.
///
/// Any store-level failure reads as the slot having been taken — the
/// orchestrator re-offers alternatives either way, and the distinction is
/// preserved in the logs.
pub async fn book_appointment(
    service: &BookingService,
    name: &str,
    phone: &str,
    date: &str,
    time: &str,
    reason: &str,
    urgency: &str,
) -> String {
    let request = BookingRequest {
        patient_name: name.to_string(),
        phone: phone.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        reason: reason.to_string(),
        urgency: Urgency::parse_lenient(urgency),
    };

    match service.book(request).await {
        Ok(_) => {
            format!("Confirmed! Booked {name} for {reason} on {date} at {time}. SMS sent.")
        }
        Err(BookingError::Validation(msg)) => format!("Error: {msg}"),
        Err(e) => {
            if e.is_store_error() {
                tracing::error!(error = %e, "booking failed at the store");
            }
            "Error: Slot just became unavailable.".to_string()
        }
    }
}

/// Cancels an appointment located by `(name, phone, date)`.
pub async fn cancel_appointment(
    service: &BookingService,
    name: &str,
    phone: &str,
    date: &str,
    reason: &str,
) -> String {
    match service.cancel(name, phone, date, reason).await {
        Ok(()) => format!(
            "Confirmed. Your appointment on {date} has been cancelled. Reason noted: {reason}."
        ),
        Err(e) => {
            if e.is_store_error() {
                tracing::error!(error = %e, "cancellation failed at the store");
            }
            "I couldn't find an appointment matching those details to cancel.".to_string()
        }
    }
}

/// Moves an appointment located by `(name, phone, old_date)` to a new slot.
pub async fn reschedule_appointment(
    service: &BookingService,
    name: &str,
    phone: &str,
    old_date: &str,
    new_date: &str,
    new_time: &str,
) -> String {
    match service
        .reschedule(name, phone, old_date, new_date, new_time)
        .await
    {
        Ok(_) => format!(
            "Success! The appointment for {name} has been moved to {new_date} at {new_time}."
        ),
        Err(BookingError::NotFound) => {
            format!("I couldn't find an appointment for {name} on {old_date}.")
        }
        Err(BookingError::SlotConflict) => {
            format!("I'm sorry, {new_time} on {new_date} is already taken.")
        }
        Err(BookingError::Validation(msg)) => format!("Error: {msg}"),
        Err(e) => format!("Database error: {e}"),
    }
}

/// Records a non-urgent message for the clinical team.
///
/// The message lands in the structured log stream the clinic reviews;
/// nothing is persisted in the appointment book.
pub fn log_doctor_message(patient_name: &str, message: &str) -> String {
    tracing::info!(
        patient = %patient_name,
        %message,
        "message for the clinical team"
    );
    "I have logged that message for the doctor. They will review it and we will get back to you if needed."
        .to_string()
}
