//! The booking service: book, cancel, reschedule, availability.
//!
//! Operations are invoked concurrently by many independent callers (one
//! per live call in the dialog orchestrator). Every store access is
//! blocking SQLite I/O and is off-loaded via `spawn_blocking` so a slow
//! store call cannot stall unrelated callers, and every store access runs
//! under a bounded deadline surfaced as a store error rather than hanging.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use frontdesk_db::DbPool;
use frontdesk_notify::NotificationSink;

use crate::error::BookingError;
use crate::model::{Appointment, NewAppointment, Urgency};
use crate::store;

/// Default deadline for a single store operation.
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Async facade over the appointment store.
#[derive(Clone)]
pub struct BookingService {
    pool: DbPool,
    sink: Arc<dyn NotificationSink>,
    op_timeout: Duration,
}

/// Arguments for [`BookingService::book`].
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub urgency: Urgency,
}

impl BookingService {
    /// Creates a booking service over the given pool and notification sink.
    pub fn new(pool: DbPool, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            pool,
            sink,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    /// Overrides the per-operation store deadline.
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Runs a blocking store closure on the blocking thread pool under the
    /// operation deadline.
    ///
    /// On expiry the caller gets [`BookingError::Timeout`]; the blocking
    /// call itself keeps its connection until it returns, the caller just
    /// stops waiting for it.
    async fn with_conn<T, F>(&self, op: F) -> Result<T, BookingError>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> Result<T, BookingError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn)
        });

        match tokio::time::timeout(self.op_timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(BookingError::Timeout),
        }
    }

    /// Books a new appointment.
    ///
    /// Input is validated before any store access; the insert itself is the
    /// only occupancy authority. On success a confirmation SMS is handed to
    /// the notification sink as a fire-and-forget side effect — its outcome
    /// never affects the returned result.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, BookingError> {
        validate_identity(&request.patient_name, &request.phone)?;
        validate_slot(&request.date, &request.time)?;

        let new = NewAppointment {
            patient_name: request.patient_name,
            phone: request.phone,
            date: request.date,
            time: request.time,
            reason: request.reason,
            urgency: request.urgency,
        };

        let appointment = self
            .with_conn(move |conn| store::insert_appointment(conn, &new))
            .await?;

        tracing::info!(
            id = appointment.id,
            date = %appointment.date,
            time = %appointment.time,
            urgency = %appointment.urgency,
            "appointment booked"
        );

        let sink = Arc::clone(&self.sink);
        let phone = appointment.phone.clone();
        let message = format!(
            "Your appointment for {} on {} at {} is confirmed.",
            appointment.reason, appointment.date, appointment.time
        );
        tokio::spawn(async move {
            if !sink.send(&phone, &message).await {
                tracing::warn!("booking confirmation SMS was not delivered");
            }
        });

        Ok(appointment)
    }

    /// Cancels the confirmed appointment matching `(patient_name, phone,
    /// date)`. The caller-stated reason is stored for audit, not validated.
    pub async fn cancel(
        &self,
        patient_name: &str,
        phone: &str,
        date: &str,
        reason: &str,
    ) -> Result<(), BookingError> {
        let (patient_name, phone, date, reason) = (
            patient_name.to_string(),
            phone.to_string(),
            date.to_string(),
            reason.to_string(),
        );
        self.with_conn(move |conn| {
            store::cancel_appointment(conn, &patient_name, &phone, &date, &reason)
        })
        .await?;

        tracing::info!("appointment cancelled");
        Ok(())
    }

    /// Moves the confirmed appointment matching `(patient_name, phone,
    /// old_date)` to a new slot. The locate / occupancy-check / update
    /// sequence is atomic with respect to concurrent bookings and
    /// reschedules targeting the same slot.
    pub async fn reschedule(
        &self,
        patient_name: &str,
        phone: &str,
        old_date: &str,
        new_date: &str,
        new_time: &str,
    ) -> Result<Appointment, BookingError> {
        validate_slot(new_date, new_time)?;

        let (patient_name, phone, old_date, new_date, new_time) = (
            patient_name.to_string(),
            phone.to_string(),
            old_date.to_string(),
            new_date.to_string(),
            new_time.to_string(),
        );
        let appointment = self
            .with_conn(move |conn| {
                store::reschedule_appointment(
                    conn,
                    &patient_name,
                    &phone,
                    &old_date,
                    &new_date,
                    &new_time,
                )
            })
            .await?;

        tracing::info!(
            id = appointment.id,
            date = %appointment.date,
            time = %appointment.time,
            "appointment rescheduled"
        );
        Ok(appointment)
    }

    /// True iff no active appointment occupies `(date, time)`.
    ///
    /// Advisory only — callers must not treat a `true` result as a
    /// reservation; [`BookingService::book`] re-validates atomically.
    pub async fn check_availability(
        &self,
        date: &str,
        time: &str,
    ) -> Result<bool, BookingError> {
        validate_slot(date, time)?;

        let (date, time) = (date.to_string(), time.to_string());
        self.with_conn(move |conn| store::is_slot_available(conn, &date, &time))
            .await
    }
}

/// Rejects empty name or phone before any store access.
fn validate_identity(patient_name: &str, phone: &str) -> Result<(), BookingError> {
    if patient_name.trim().is_empty() {
        return Err(BookingError::Validation("patient name is empty".into()));
    }
    if phone.trim().is_empty() {
        return Err(BookingError::Validation("phone number is empty".into()));
    }
    Ok(())
}

/// Rejects unparseable slot components before any store access.
fn validate_slot(date: &str, time: &str) -> Result<(), BookingError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("invalid date: {date}")))?;
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| BookingError::Validation(format!("invalid time: {time}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_validation_accepts_canonical_forms() {
        assert!(validate_slot("2025-06-10", "09:00").is_ok());
        assert!(validate_slot("2025-12-31", "23:59").is_ok());
    }

    #[test]
    fn slot_validation_rejects_malformed_input() {
        for (date, time) in [
            ("10-06-2025", "09:00"),
            ("2025-06-10", "9am"),
            ("2025-13-01", "09:00"),
            ("2025-06-10", "25:00"),
            ("", "09:00"),
        ] {
            let err = validate_slot(date, time).expect_err("should reject");
            assert!(matches!(err, BookingError::Validation(_)));
        }
    }

    #[test]
    fn identity_validation_rejects_blank_fields() {
        assert!(validate_identity("Asha", "+911234567890").is_ok());
        assert!(matches!(
            validate_identity("  ", "+911234567890"),
            Err(BookingError::Validation(_))
        ));
        assert!(matches!(
            validate_identity("Asha", ""),
            Err(BookingError::Validation(_))
        ));
    }
}
