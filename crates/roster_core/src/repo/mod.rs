//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data store contract consumed by reconciliation.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`StudentNotFound`,
//!   `EnrollmentNotFound`) in addition to DB transport errors.
//! - Repositories never filter logically-deleted students on their own.

pub mod student_repo;
