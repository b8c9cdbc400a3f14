//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and recurrence expansion into use-case APIs.
//! - Scope every read and write by owner.
//! - Keep CLI callers decoupled from storage details.

pub mod calendar_service;
pub mod project_service;
