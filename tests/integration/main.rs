//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Nothing here opens a socket or touches the
//! real credential file.

mod mock;
mod pipeline_tests;
mod session_tests;
