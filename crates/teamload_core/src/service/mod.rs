//! Use-case services over the registries.
//!
//! # Responsibility
//! - Derive allocation views from registry snapshots.
//! - Provide the dashboard entry points (create/edit gate, import/export).

pub mod aggregation;
pub mod dashboard_service;
