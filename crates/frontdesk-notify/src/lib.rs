//! Notification boundary for the frontdesk booking core.
//!
//! Everything that leaves the system as a text message goes through the
//! [`NotificationSink`] trait: booking confirmations fired by the booking
//! service and pre-appointment reminders fired by the sweep. Delivery is
//! best-effort — a sink reports success or failure, logs the details, and
//! never raises an error into booking or reminder outcomes.

mod sink;
mod sms;

pub use sink::{LogSink, NotificationSink};
pub use sms::{SmsClient, SmsConfig, SmsInitError};
