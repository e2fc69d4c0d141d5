//! Appointment data model.
//!
//! One entity: the appointment. A slot is the `(date, time)` pair; slots are
//! atomic units with no duration or overlap model. Dates and times are
//! carried as the two canonical strings of the tool-call boundary
//! (`YYYY-MM-DD` and `HH:MM` 24-hour) and validated with chrono before any
//! store access.

use serde::{Deserialize, Serialize};

/// Triage urgency assigned at the dialog boundary.
///
/// `U1`–`U3` are the escalation tags used for severe pain, swelling,
/// bleeding, or trauma; everything else books as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    /// Routine booking.
    #[serde(rename = "normal")]
    Normal,
    /// Escalation tier 1.
    #[serde(rename = "U1")]
    U1,
    /// Escalation tier 2.
    #[serde(rename = "U2")]
    U2,
    /// Escalation tier 3.
    #[serde(rename = "U3")]
    U3,
}

impl Urgency {
    /// Returns the canonical string label stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::U1 => "U1",
            Self::U2 => "U2",
            Self::U3 => "U3",
        }
    }

    /// Parses an urgency label leniently.
    ///
    /// The dialog orchestrator passes free-form strings; anything that is
    /// not a recognised escalation tag books as `Normal` rather than
    /// failing the call.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "U1" => Self::U1,
            "U2" => Self::U2,
            "U3" => Self::U3,
            _ => Self::Normal,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Booked and holding its slot.
    #[serde(rename = "confirmed")]
    Confirmed,
    /// Cancelled; the row is retained for audit and the slot is released.
    #[serde(rename = "cancelled")]
    Cancelled,
    /// Moved to a new slot by a reschedule. Still holds its (new) slot,
    /// but is no longer eligible for reminders or further identity lookups.
    #[serde(rename = "rescheduled")]
    Rescheduled,
}

impl AppointmentStatus {
    /// Returns the canonical string label stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "rescheduled" => Ok(Self::Rescheduled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone)]
pub struct ParseStatusError(pub String);

impl std::fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown appointment status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

/// A single row from the `appointments` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Store-generated row ID.
    pub id: i64,
    /// Patient's full name; identity component.
    pub patient_name: String,
    /// Patient's phone number; identity component and SMS target.
    pub phone: String,
    /// Slot date, `YYYY-MM-DD`.
    pub date: String,
    /// Slot time, `HH:MM` 24-hour.
    pub time: String,
    /// Free-text visit reason, unvalidated.
    pub reason: String,
    /// Triage urgency.
    pub urgency: Urgency,
    /// Lifecycle status.
    pub status: AppointmentStatus,
    /// Whether the pre-appointment reminder has been sent. Monotonic:
    /// transitions false→true exactly once, never reset.
    pub reminder_sent: bool,
    /// Caller-stated reason recorded when the appointment was cancelled.
    pub cancel_reason: Option<String>,
    /// Creation timestamp (ISO 8601, UTC).
    pub created_at: String,
}

/// Parameters for creating a new appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub urgency: Urgency,
}
