//! Periodic reminder sweep for upcoming appointments.
//!
//! A single background task wakes on a fixed interval, selects confirmed,
//! not-yet-reminded appointments whose slot falls inside the lookahead
//! window, and sends each patient one SMS. Per appointment the order is
//! **send, then mark**: if the mark fails after a successful send, the
//! next sweep may send a duplicate — that at-least-once behavior is
//! deliberate, because the reverse order could silently skip a reminder.
//! Marks commit per appointment, so a crash mid-sweep leaves earlier
//! appointments sent-and-marked and later ones untouched for the next
//! sweep.
//!
//! The task is a plain cancellable interval timer, not a job scheduler:
//! shutdown is observed only between ticks, so an in-flight sweep always
//! finishes before the task releases its store handle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use frontdesk_booking::store;
use frontdesk_db::DbPool;
use frontdesk_notify::NotificationSink;
use tokio::sync::watch;
use tokio::time::sleep;

/// Timing parameters for the reminder sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderConfig {
    /// Time between sweeps.
    pub interval: Duration,

    /// Lookahead window: a sweep at `now` selects appointments with
    /// `now < slot <= now + window`.
    pub window: Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            window: Duration::from_secs(3_600),
        }
    }
}

/// Counters for a single sweep, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Appointments selected by the window query.
    pub due: usize,
    /// Reminders the sink confirmed as handed off.
    pub sent: usize,
    /// Appointments whose reminder flag transitioned in this sweep.
    pub marked: usize,
}

/// Runs reminder sweeps until `shutdown` fires, then drains.
///
/// Shutdown is checked only between ticks; a sweep that has already
/// started runs to completion before the task returns.
pub async fn run_reminder_task(
    pool: DbPool,
    sink: Arc<dyn NotificationSink>,
    config: ReminderConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        interval_seconds = config.interval.as_secs(),
        window_seconds = config.window.as_secs(),
        "starting reminder sweep task"
    );

    loop {
        tokio::select! {
            _ = sleep(config.interval) => {}
            _ = shutdown.changed() => {
                break;
            }
        }

        let now = Utc::now().naive_utc();
        let stats = run_sweep(&pool, sink.as_ref(), config.window, now).await;
        if stats.due > 0 {
            tracing::info!(
                due = stats.due,
                sent = stats.sent,
                marked = stats.marked,
                "reminder sweep finished"
            );
        } else {
            tracing::debug!("no reminders due");
        }
    }

    tracing::info!("reminder sweep task drained and stopped");
}

/// Executes one sweep at the given instant.
///
/// A failure to send or mark one appointment never aborts the rest of the
/// sweep; each appointment is processed and committed independently.
/// Delivery is best-effort and not retried, so the reminder flag is set
/// whether or not the sink confirmed the hand-off.
pub async fn run_sweep(
    pool: &DbPool,
    sink: &dyn NotificationSink,
    window: Duration,
    now: NaiveDateTime,
) -> SweepStats {
    let Ok(lookahead) = TimeDelta::from_std(window) else {
        tracing::error!(window_seconds = window.as_secs(), "reminder window overflow");
        return SweepStats::default();
    };

    let window_start = now.format("%Y-%m-%d %H:%M").to_string();
    let window_end = (now + lookahead).format("%Y-%m-%d %H:%M").to_string();

    // One pooled connection per query keeps the snapshot consistent for
    // the selection; a cancellation committing after the query may still
    // receive a reminder, which is an accepted staleness window.
    let due = {
        let pool = pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(frontdesk_booking::BookingError::from)?;
            store::query_due_reminders(&conn, &window_start, &window_end)
        })
        .await;

        match result {
            Ok(Ok(due)) => due,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "failed to query due reminders");
                return SweepStats::default();
            }
            Err(e) => {
                tracing::error!(error = %e, "reminder query task panicked or was cancelled");
                return SweepStats::default();
            }
        }
    };

    let mut stats = SweepStats {
        due: due.len(),
        ..SweepStats::default()
    };

    for appointment in due {
        let message = format!(
            "Reminder: your appointment for {} is on {} at {}.",
            appointment.reason, appointment.date, appointment.time
        );

        if sink.send(&appointment.phone, &message).await {
            stats.sent += 1;
        } else {
            tracing::warn!(
                id = appointment.id,
                "reminder SMS was not delivered; marking anyway (no retry policy)"
            );
        }

        let pool = pool.clone();
        let id = appointment.id;
        let marked = tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(frontdesk_booking::BookingError::from)?;
            store::mark_reminder_sent(&conn, id)
        })
        .await;

        match marked {
            Ok(Ok(true)) => stats.marked += 1,
            Ok(Ok(false)) => {
                // Another sweep won the race to mark this row; the flag is
                // monotonic, so there is nothing to do.
                tracing::debug!(id, "reminder already marked");
            }
            Ok(Err(e)) => {
                tracing::error!(id, error = %e, "failed to mark reminder as sent");
            }
            Err(e) => {
                tracing::error!(id, error = %e, "reminder mark task panicked or was cancelled");
            }
        }
    }

    stats
}
