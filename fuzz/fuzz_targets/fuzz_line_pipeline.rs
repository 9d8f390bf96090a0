//! Fuzz target: `AppService::handle_line`
//!
//! Runs arbitrary text through the full pipeline with a fixed credential
//! set.  Invariants checked:
//! - No panics under any input
//! - The breaker is never left closed with the voltage out of window
//!   after an accepted non-exit command
//! - A rejected line leaves the register bank untouched
//!
//! cargo fuzz run fuzz_line_pipeline

#![no_main]

use breakerd::adapters::credentials::MemoryCredentialStore;
use breakerd::app::ports::NullSink;
use breakerd::safety::Interlock;
use breakerd::{AppService, ServerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let app = AppService::new(
        MemoryCredentialStore::parse("seth zzz 15\nbob pw 1\n"),
        &ServerConfig::default(),
    );

    let before = app.snapshot();
    let out = app.handle_line(&line, &mut NullSink);

    match out.reply {
        Err(_) => assert_eq!(app.snapshot(), before),
        Ok(()) if !out.close_session => {
            assert!(!Interlock::trip_conditions_met(&app.snapshot()));
        }
        Ok(()) => {}
    }
});
