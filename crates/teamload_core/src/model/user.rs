//! Team member identity model.
//!
//! # Responsibility
//! - Define the live `User` record owned by the user registry.
//! - Provide the synthesized default "Me" identity.
//!
//! # Invariants
//! - `is_me` is never patchable; the registry owns the single-Me rule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier shared by `User` and the `TeamMember` snapshots taken from it.
pub type UserId = String;

/// Stable id of the synthesized "Me" record.
pub const DEFAULT_ME_ID: &str = "user-me";
/// Display name of the synthesized "Me" record.
pub const DEFAULT_ME_NAME: &str = "Me";
/// Display color used for "Me" and for legacy records without a color.
pub const DEFAULT_COLOR: &str = "#6366f1";

/// Live team member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Display hint only; never validated.
    pub color: String,
    /// Older exports omit the flag for regular members.
    #[serde(default)]
    pub is_me: bool,
}

impl User {
    /// Creates a regular (non-"Me") member with a generated id.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
            is_me: false,
        }
    }

    /// Returns the default "Me" identity synthesized on first load.
    pub fn default_me() -> Self {
        Self {
            id: DEFAULT_ME_ID.to_string(),
            name: DEFAULT_ME_NAME.to_string(),
            color: DEFAULT_COLOR.to_string(),
            is_me: true,
        }
    }

    /// Merges the populated fields of `patch` into this record.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

/// Partial update for a `User`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}
