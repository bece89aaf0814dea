//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todotab_core` linkage without the mobile runtime.
//! - Print a read-only view of a storage file when one is given.
//!
//! Usage: `todotab [DB_PATH]`

use std::process::ExitCode;
use todotab_core::{open_store, Category, LoadStatus};

fn main() -> ExitCode {
    println!("todotab_core ping={}", todotab_core::ping());
    println!("todotab_core version={}", todotab_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let (store, report) = match open_store(&db_path) {
        Ok(opened) => opened,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let LoadStatus::Corrupted { reason } = &report.todos {
        eprintln!("warning: stored to-dos unreadable ({reason}); showing empty list");
    }

    let active = store.active_category();
    for category in Category::ALL {
        let marker = if category == active { "*" } else { " " };
        let count = store.records().in_category(category).count();
        println!("{marker} {} ({count})", category.label());
    }
    for row in store.visible() {
        let check = if row.complete { "x" } else { " " };
        println!("  [{check}] {} {}", row.id, row.text);
    }
    ExitCode::SUCCESS
}
