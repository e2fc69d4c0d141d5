//! Appointment booking core for the frontdesk clinic assistant.
//!
//! Implements the slot store, the availability query, the booking service
//! (book / cancel / reschedule), and the tool-call boundary that renders
//! structured outcomes into the fixed phrases the dialog orchestrator
//! speaks. The reminder sweep lives in `frontdesk-reminder` and reuses the
//! store operations exported here.
//!
//! # Exclusivity model
//!
//! A slot is a `(date, time)` pair. At most one *active* appointment
//! (status `confirmed` or `rescheduled`) may hold a slot at a time,
//! enforced by a partial unique index at the store — never by an
//! application-level check-then-act. Availability reads are advisory;
//! the insert or reschedule write is the only authority.

mod error;
mod model;
mod service;
pub mod store;
pub mod tools;

pub use error::BookingError;
pub use model::{Appointment, AppointmentStatus, NewAppointment, ParseStatusError, Urgency};
pub use service::{BookingRequest, BookingService};
