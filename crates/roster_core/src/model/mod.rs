//! Domain model for students and their course enrollments.
//!
//! # Responsibility
//! - Define canonical data structures used by reconciliation and reads.
//! - Keep input validation rules next to the types they guard.
//!
//! # Invariants
//! - Every student is identified by a stable `StudentId`.
//! - Deletion is logical (`deleted` flag), never physical.

pub mod detail;
pub mod enrollment;
pub mod student;
pub mod validation;
