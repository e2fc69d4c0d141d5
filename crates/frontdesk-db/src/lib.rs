//! Database layer for the frontdesk booking core.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and the schema every other crate depends on.
//! The appointment table and its slot-exclusivity index are created through
//! versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: the booking core runs alongside the voice
//!   pipeline on a single host — no external database process. WAL mode
//!   allows concurrent readers with a single writer, which matches the
//!   pattern of many availability reads against occasional booking writes.
//! - **`r2d2` connection pool**: explicit store handles with scoped
//!   acquisition and guaranteed release on every exit path, instead of
//!   per-call open/close of raw connections.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, ensuring the schema ships with the code that depends
//!   on it and cannot drift.

mod migrations;
mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool, DbRuntimeSettings};
