//! breakerd library.
//!
//! A line-oriented remote-command service for a simulated breaker panel.
//! Every line is authenticated and authorized on its own, applied to a
//! 256-byte register bank, and followed by a circuit-breaker interlock
//! pass.  The pure pipeline lives in [`app`]; sockets and credential
//! files are [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registers;
pub mod safety;
pub mod session;

pub use app::service::{AppService, LineOutcome, ServiceOptions};
pub use config::ServerConfig;
pub use error::CommandError;
pub use registers::{Register, RegisterBank};
