//! Per-connection session handler.
//!
//! ```text
//!            ┌──────────────┐  line   ┌──────────────────────────────┐
//!   ┌───────▶│ AwaitingLine │────────▶│ AppService::handle_line      │
//!   │        └──────────────┘         │ authn → authz → dispatch →   │
//!   │               │ EOF / error /   │ interlock                    │
//!   │               │ idle timeout    └──────────────────────────────┘
//!   │               ▼                        │ reply          │ exit
//!   │        ┌──────────────┐                │                ▼
//!   │        │    Closed    │◀───────────────┼──────────── reply OK
//!   │        └──────────────┘                │
//!   └────────────────────────────────────────┘
//! ```
//!
//! Lines are handled strictly in order; one line (interlock included) is
//! fully resolved before the next is read.  No authentication state is
//! kept between lines.

use std::io::{ErrorKind, Read, Write};

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{CredentialStore, EventSink};
use crate::app::service::{AppService, LineOutcome};
use crate::error::CommandError;
use crate::protocol::codec::{DecodedLine, LineDecoder};

const READ_BUF_SIZE: usize = 1024;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingLine,
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the connection.
    PeerClosed,
    /// An authorized `exit` command.
    Exit,
    /// No data within the configured read timeout.
    TimedOut,
    /// The connection failed.
    Io(ErrorKind),
}

/// One client connection's command loop.
pub struct Session<'a, C, S> {
    id: u64,
    service: &'a AppService<C>,
    sink: S,
    decoder: LineDecoder,
    max_line_len: usize,
    state: SessionState,
    lines: u64,
}

impl<'a, C: CredentialStore, S: EventSink> Session<'a, C, S> {
    pub fn new(id: u64, service: &'a AppService<C>, sink: S, max_line_len: usize) -> Self {
        Self {
            id,
            service,
            sink,
            decoder: LineDecoder::new(max_line_len),
            max_line_len,
            state: SessionState::AwaitingLine,
            lines: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Lines handled so far.
    pub fn lines_handled(&self) -> u64 {
        self.lines
    }

    /// Drive the session until the connection closes or `exit` is accepted.
    pub fn run<T: Read + Write>(&mut self, conn: &mut T) -> SessionEnd {
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            let n = match conn.read(&mut buf) {
                Ok(0) => return self.finish(conn),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return self.close(SessionEnd::TimedOut);
                }
                Err(e) => {
                    warn!("[{}] read failed: {}", self.id, e);
                    return self.close(SessionEnd::Io(e.kind()));
                }
            };

            self.decoder.feed(&buf[..n]);
            while let Some(line) = self.decoder.next_line() {
                if let Some(end) = self.respond(line, conn) {
                    return self.close(end);
                }
            }
        }
    }

    /// Peer hung up: handle an unterminated last line, then close.
    fn finish<T: Write>(&mut self, conn: &mut T) -> SessionEnd {
        let end = self
            .decoder
            .finish()
            .and_then(|line| self.respond(line, conn))
            .unwrap_or(SessionEnd::PeerClosed);
        self.close(end)
    }

    /// Handle one decoded line.  `Some` ends the session.
    fn respond<T: Write>(&mut self, line: DecodedLine, conn: &mut T) -> Option<SessionEnd> {
        self.lines += 1;
        let outcome = match line {
            DecodedLine::Line(text) => {
                debug!("[{}] <- {:?}", self.id, text);
                self.service.handle_line(&text, &mut self.sink)
            }
            DecodedLine::TooLong => {
                warn!("[{}] line over {} bytes dropped", self.id, self.max_line_len);
                self.sink.emit(&AppEvent::CommandRejected(CommandError::MalformedInput));
                self.service.report_registers(&mut self.sink);
                LineOutcome::rejected(CommandError::MalformedInput)
            }
        };

        if let Err(e) = writeln!(conn, "{}", outcome.wire_text()).and_then(|()| conn.flush()) {
            warn!("[{}] write failed: {}", self.id, e);
            return Some(SessionEnd::Io(e.kind()));
        }
        outcome.close_session.then_some(SessionEnd::Exit)
    }

    fn close(&mut self, end: SessionEnd) -> SessionEnd {
        self.state = SessionState::Closed;
        self.decoder.reset();
        info!("[{}] session closed: {:?} after {} line(s)", self.id, end, self.lines);
        end
    }
}
