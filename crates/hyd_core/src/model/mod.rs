//! Domain model for reminders, profile state and ranks.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep static policy tables (category points, rank tiers) next to the
//!   types they describe.
//!
//! # Invariants
//! - Every reminder is identified by a stable `ReminderId`.
//! - Derived values (rank) are computed, never persisted.

pub mod mood;
pub mod profile;
pub mod rank;
pub mod reminder;
