//! Persistence operations for the appointment book.
//!
//! All writes are individually atomic. Slot exclusivity is never enforced
//! by a check followed by an unguarded write: the insert relies on the
//! partial unique index over active slots, and the reschedule runs its
//! locate / occupancy-check / update sequence inside a savepoint so it is
//! observed as indivisible with respect to concurrent writers.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::BookingError;
use crate::model::{Appointment, AppointmentStatus, NewAppointment, Urgency};

/// True when a SQLite error is the slot index rejecting a duplicate
/// active slot.
fn is_slot_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn map_row_to_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let status_str: String = row.get(7)?;
    let status: AppointmentStatus = status_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            7, // index of status
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;

    let urgency_str: String = row.get(6)?;

    Ok(Appointment {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        phone: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        reason: row.get(5)?,
        urgency: Urgency::parse_lenient(&urgency_str),
        status,
        reminder_sent: row.get(8)?,
        cancel_reason: row.get(9)?,
        created_at: row.get(10)?,
    })
}

const APPOINTMENT_COLUMNS: &str = "id, patient_name, phone, date, time, reason, urgency, \
     status, reminder_sent, cancel_reason, created_at";

/// Inserts a new confirmed appointment, claiming its slot.
///
/// The occupancy check and the write are one atomic unit: the INSERT
/// itself fails on the slot index if an active appointment already holds
/// `(date, time)`, which is surfaced as [`BookingError::SlotConflict`].
pub fn insert_appointment(
    conn: &Connection,
    new: &NewAppointment,
) -> Result<Appointment, BookingError> {
    let result = conn.query_row(
        "INSERT INTO appointments (patient_name, phone, date, time, reason, urgency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING id, created_at",
        params![
            new.patient_name,
            new.phone,
            new.date,
            new.time,
            new.reason,
            new.urgency.as_str(),
        ],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
    );

    match result {
        Ok((id, created_at)) => Ok(Appointment {
            id,
            patient_name: new.patient_name.clone(),
            phone: new.phone.clone(),
            date: new.date.clone(),
            time: new.time.clone(),
            reason: new.reason.clone(),
            urgency: new.urgency,
            status: AppointmentStatus::Confirmed,
            reminder_sent: false,
            cancel_reason: None,
            created_at,
        }),
        Err(e) if is_slot_conflict(&e) => Err(BookingError::SlotConflict),
        Err(e) => Err(e.into()),
    }
}

/// Looks up the confirmed appointment matching `(patient_name, phone, date)`.
///
/// This is the identity match used by cancel and reschedule when no durable
/// appointment handle exists at the dialog boundary.
pub fn find_by_identity(
    conn: &Connection,
    patient_name: &str,
    phone: &str,
    date: &str,
) -> Result<Appointment, BookingError> {
    conn.query_row(
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE patient_name = ?1 AND phone = ?2 AND date = ?3
               AND status = 'confirmed'"
        ),
        params![patient_name, phone, date],
        map_row_to_appointment,
    )
    .optional()?
    .ok_or(BookingError::NotFound)
}

/// Returns the active appointment occupying a slot, if any.
///
/// `exclude_id` lets a reschedule ignore the appointment being moved when
/// probing its own target slot.
pub fn find_by_slot(
    conn: &Connection,
    date: &str,
    time: &str,
    exclude_id: Option<i64>,
) -> Result<Option<Appointment>, BookingError> {
    let found = conn
        .query_row(
            &format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE date = ?1 AND time = ?2
                   AND status IN ('confirmed', 'rescheduled')
                   AND (?3 IS NULL OR id != ?3)"
            ),
            params![date, time, exclude_id],
            map_row_to_appointment,
        )
        .optional()?;
    Ok(found)
}

/// True iff no active appointment occupies `(date, time)`.
///
/// Advisory only: a `true` result is not a reservation. The booking insert
/// re-validates atomically against the slot index.
pub fn is_slot_available(conn: &Connection, date: &str, time: &str) -> Result<bool, BookingError> {
    Ok(find_by_slot(conn, date, time, None)?.is_none())
}

/// Cancels the confirmed appointment matching the identity tuple.
///
/// Soft delete: the row is retained with `status = 'cancelled'` and the
/// caller-stated reason stored for audit. The slot index no longer counts
/// the row, so the slot is released in the same atomic statement.
pub fn cancel_appointment(
    conn: &Connection,
    patient_name: &str,
    phone: &str,
    date: &str,
    reason: &str,
) -> Result<(), BookingError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET status = 'cancelled', cancel_reason = ?4
         WHERE patient_name = ?1 AND phone = ?2 AND date = ?3
           AND status = 'confirmed'",
        params![patient_name, phone, date, reason],
    )?;

    if changed == 0 {
        return Err(BookingError::NotFound);
    }
    Ok(())
}

/// Moves the confirmed appointment matching `(patient_name, phone,
/// old_date)` to a new slot.
///
/// Locate, occupancy check, and update run inside one savepoint. A
/// concurrent booking that claims the target slot between the check and
/// the update is still caught: the UPDATE itself trips the slot index,
/// which rolls the savepoint back and surfaces as
/// [`BookingError::SlotConflict`].
pub fn reschedule_appointment(
    conn: &mut Connection,
    patient_name: &str,
    phone: &str,
    old_date: &str,
    new_date: &str,
    new_time: &str,
) -> Result<Appointment, BookingError> {
    let sp = conn.savepoint()?;

    let mut appointment = find_by_identity(&sp, patient_name, phone, old_date)?;

    if find_by_slot(&sp, new_date, new_time, Some(appointment.id))?.is_some() {
        // Savepoint drop rolls back; nothing has been written yet.
        return Err(BookingError::SlotConflict);
    }

    let update = sp.execute(
        "UPDATE appointments
         SET date = ?1, time = ?2, status = 'rescheduled'
         WHERE id = ?3",
        params![new_date, new_time, appointment.id],
    );

    match update {
        Ok(_) => {}
        Err(e) if is_slot_conflict(&e) => return Err(BookingError::SlotConflict),
        Err(e) => return Err(e.into()),
    }

    sp.commit()?;

    appointment.date = new_date.to_string();
    appointment.time = new_time.to_string();
    appointment.status = AppointmentStatus::Rescheduled;
    Ok(appointment)
}

/// Returns confirmed, not-yet-reminded appointments whose slot falls in
/// `(window_start, window_end]`, ascending by slot time.
///
/// Window bounds are `YYYY-MM-DD HH:MM` strings; the stored date/time
/// strings compare correctly under lexicographic order in that layout.
pub fn query_due_reminders(
    conn: &Connection,
    window_start: &str,
    window_end: &str,
) -> Result<Vec<Appointment>, BookingError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE status = 'confirmed'
           AND reminder_sent = 0
           AND (date || ' ' || time) > ?1
           AND (date || ' ' || time) <= ?2
         ORDER BY date ASC, time ASC"
    ))?;

    let rows = stmt.query_map(params![window_start, window_end], map_row_to_appointment)?;
    let mut due = Vec::new();
    for row in rows {
        due.push(row?);
    }
    Ok(due)
}

/// Marks an appointment's reminder as sent.
///
/// Returns `true` if this call performed the false→true transition, and
/// `false` if the reminder was already marked (the flag is monotonic and
/// never reset, so a second marker is a no-op rather than an error).
pub fn mark_reminder_sent(conn: &Connection, id: i64) -> Result<bool, BookingError> {
    let changed = conn.execute(
        "UPDATE appointments SET reminder_sent = 1 WHERE id = ?1 AND reminder_sent = 0",
        [id],
    )?;
    Ok(changed == 1)
}
