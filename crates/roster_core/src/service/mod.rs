//! Core use-case services.
//!
//! # Responsibility
//! - Compose read aggregates and reconcile writes over the repository.
//! - Keep outer layers (CLI, future transports) decoupled from storage.

pub mod detail_composer;
pub mod enrollment_reconciler;
pub mod student_service;
