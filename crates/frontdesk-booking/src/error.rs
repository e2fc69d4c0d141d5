//! Error types for booking operations.

/// Errors that can occur during booking operations.
///
/// Every public operation surfaces exactly one of: success, `SlotConflict`,
/// `NotFound`, `Validation`, or a store-level failure (`Database`, `Pool`,
/// `Task`, `Timeout`). Notification delivery failures are logged by the
/// sink and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Malformed input, rejected before any store access.
    #[error("validation error: {0}")]
    Validation(String),

    /// The target slot is already held by an active appointment.
    #[error("slot is already booked")]
    SlotConflict,

    /// No confirmed appointment matches the identity lookup.
    #[error("no matching appointment found")]
    NotFound,

    /// A database operation failed.
    #[error("booking database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The connection pool could not hand out a connection.
    #[error("booking pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The off-loaded store task panicked or was cancelled.
    #[error("booking task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A store operation exceeded its deadline.
    #[error("store operation timed out")]
    Timeout,
}

impl BookingError {
    /// True for store-level failures: anything not attributable to a
    /// known conflict, a missing row, or bad input.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Pool(_) | Self::Task(_) | Self::Timeout
        )
    }
}
