//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pocketnote_core` linkage.
//! - Exercise one in-memory store round trip without any UI runtime.

use pocketnote_core::{NoteDraft, NoteStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pocketnote_core ping={}", pocketnote_core::ping());
    println!("pocketnote_core version={}", pocketnote_core::core_version());

    let smoke = NoteStore::open_in_memory().and_then(|store| {
        store.insert(NoteDraft::new("smoke", "smoke check"))?;
        store.count()
    });
    match smoke {
        Ok(count) => {
            println!("pocketnote_core store=ok notes={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("pocketnote_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}
