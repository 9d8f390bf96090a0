//! Application core — the command pipeline, no I/O.
//!
//! Authentication, authorization, dispatch and the interlock pass live
//! here.  The credential source and event output are reached only through
//! the **port traits** in [`ports`], so the whole pipeline runs in tests
//! without a socket or a credential file.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
