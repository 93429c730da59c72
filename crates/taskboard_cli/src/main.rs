//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskboard_core` linkage.
//! - Open the configured store and print a short summary.

use taskboard_core::{open_store, CoreConfig};

fn main() {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());

    let config = CoreConfig::from_env();
    match open_store(&config) {
        Ok(store) => println!(
            "taskboard_core tasks={} signed_in={}",
            store.tasks().len(),
            store.is_authenticated()
        ),
        Err(err) => {
            eprintln!("taskboard_core store open failed: {err}");
            std::process::exit(1);
        }
    }
}
