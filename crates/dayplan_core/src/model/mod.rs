//! Domain model for calendar events, habits, projects and tasks.
//!
//! # Responsibility
//! - Define the recurring-item record shared by event and habit views.
//! - Define projects and their tasks.
//! - Define the transient entry shapes consumed by the calendar widget.
//!
//! # Invariants
//! - Every stored record is identified by a stable UUID.
//! - Occurrences and deadlines are derived on demand and never persisted.

pub mod item;
pub mod occurrence;
pub mod project;
