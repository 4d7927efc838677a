//! Core domain logic for TeamLoad.
//! This crate is the single source of truth for allocation rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bundle::{ImportError, TransferBundle};
pub use model::project::{
    AllocationSplit, Project, ProjectId, ProjectInput, ProjectPatch, TeamMember,
};
pub use model::record::{LegacyProject, ProjectRecord};
pub use model::user::{User, UserId, UserPatch};
pub use repo::project_registry::ProjectRegistry;
pub use repo::user_registry::UserRegistry;
pub use repo::{RegistryError, RegistryResult};
pub use service::aggregation::{
    DashboardSummary, OrphanedAssignment, ProjectAllocation, UserAllocation,
};
pub use service::dashboard_service::{DashboardService, ProjectGateError};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
