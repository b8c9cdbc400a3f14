//! Recurrence expansion for calendar events and habits.
//!
//! # Responsibility
//! - Materialize repeating items into concrete occurrences for a view window.
//! - Parse request-supplied window bounds.
//!
//! # Invariants
//! - Expansion is pure: no I/O, no shared state, no errors.
//! - Each item's occurrences are strictly increasing by `start`.
//! - At most `MAX_GENERATED_OCCURRENCES` occurrences are generated per item.

pub mod expand;
pub mod period;
pub mod window;

pub use expand::{expand, MAX_GENERATED_OCCURRENCES};
pub use window::{parse_window_bound, ViewWindow};
