//! Mock adapters for integration tests.
//!
//! `RecordingSink` keeps every emitted event so tests can assert on the
//! full history; `MockConn` is an in-memory connection fed from a script.

use std::io::{self, Read, Write};

use breakerd::adapters::credentials::MemoryCredentialStore;
use breakerd::app::events::AppEvent;
use breakerd::app::ports::EventSink;
use breakerd::{AppService, ServerConfig};

/// Credential records used across the integration suite.
pub const PASSWD: &str = "\
# user  password  level
seth    zzz       15
bob     pw        1
guest   guest     0
";

pub fn make_service() -> AppService<MemoryCredentialStore> {
    AppService::new(MemoryCredentialStore::parse(PASSWD), &ServerConfig::default())
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trips(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::BreakerTripped(_)))
            .count()
    }

    pub fn executed(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::CommandExecuted { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockConn ──────────────────────────────────────────────────

/// Delivers each chunk in `reads` as a separate `read` result, then EOF.
pub struct MockConn {
    reads: Vec<Vec<u8>>,
    pub written: Vec<u8>,
    /// Error returned after the script runs out, instead of EOF.
    pub trailing_error: Option<io::ErrorKind>,
}

#[allow(dead_code)]
impl MockConn {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            reads: chunks.iter().rev().map(|c| c.as_bytes().to_vec()).collect(),
            written: Vec::new(),
            trailing_error: None,
        }
    }

    pub fn replies(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Read for MockConn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.reads.push(chunk[n..].to_vec());
                }
                Ok(n)
            }
            None => match self.trailing_error {
                Some(kind) => Err(io::Error::from(kind)),
                None => Ok(0),
            },
        }
    }
}

impl Write for MockConn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
