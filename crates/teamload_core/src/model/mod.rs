//! Domain model for team members, projects and allocation snapshots.
//!
//! # Responsibility
//! - Define the records persisted by the user and project registries.
//! - Define the versioned project record used by load-time migration.
//! - Define the bulk interchange document used for import/export.
//!
//! # Invariants
//! - Exactly one `User` in a registry has `is_me == true`.
//! - `Project::assignments` entries have unique `id` values.
//! - Allocation totals above 100 are representable; only entry gates reject them.

pub mod bundle;
pub mod project;
pub mod record;
pub mod user;
