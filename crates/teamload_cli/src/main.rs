//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `teamload_core` linkage.
//! - Print the allocation summary of a SQLite store given as first argument,
//!   or of a throwaway in-memory store when no path is given.

use std::process::ExitCode;
use teamload_core::db::{open_db, open_db_in_memory};
use teamload_core::{DashboardService, DashboardSummary, SqliteStorage, StoreConfig};

fn main() -> ExitCode {
    println!("teamload_core ping={}", teamload_core::ping());
    println!("teamload_core version={}", teamload_core::core_version());

    let conn = match std::env::args().nth(1) {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match conn {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open store: {err}");
            return ExitCode::FAILURE;
        }
    };

    let service = DashboardService::open(SqliteStorage::new(&conn), &StoreConfig::default());
    print_summary(&service.summary());
    ExitCode::SUCCESS
}

fn print_summary(summary: &DashboardSummary) {
    for user in &summary.users {
        println!(
            "user {} total={}% frontend={}% backend={}% projects={}",
            user.name, user.total, user.frontend, user.backend, user.project_count
        );
    }
    for user in summary.over_allocated_users() {
        println!("over-allocated {} total={}%", user.name, user.total);
    }
    for project in &summary.projects {
        println!(
            "project {} total={}% unassigned={}%",
            project.project_id, project.total, project.unassigned
        );
    }
    if !summary.orphaned.is_empty() {
        println!("orphaned assignments={}", summary.orphaned.len());
    }
}
