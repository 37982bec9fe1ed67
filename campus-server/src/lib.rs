//! campus-server: HTTP API for university records
//!
//! Tracks students, courses, and the enrollments linking them.
//! Every request runs inside one store session (one transaction).

pub mod db;
pub mod http;
pub mod models;

pub use db::{DbError, MemoryStore, PgStore, Session, Store};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
