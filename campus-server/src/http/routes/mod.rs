//! Route handlers organized by resource
//!
//! Every handler opens one session, does its lookups and writes, and
//! commits before responding. Early returns drop the session, which
//! rolls the transaction back.

pub mod health;
pub mod students;
pub mod courses;
pub mod enrollments;

use serde::Serialize;

/// Plain confirmation body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Confirmation for cascading deletes
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub removed_enrollments: usize,
}
