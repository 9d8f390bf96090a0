//! Newline-delimited line codec.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────┬──────┐
//! │ ASCII command text (≤ N B)   │ '\n' │
//! └──────────────────────────────┴──────┘
//! ```
//!
//! The decoder accumulates incoming bytes and yields complete lines.  A
//! single socket read may carry part of a line, one line, or several
//! lines back to back.  A line longer than the configured maximum is
//! reported once as [`DecodedLine::TooLong`] and the rest of it is
//! discarded up to the next newline.

use std::collections::VecDeque;

/// One decoder output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLine {
    /// A complete line, newline stripped, invalid UTF-8 replaced.
    Line(String),
    /// A line exceeded the length limit and was dropped.
    TooLong,
}

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Appending bytes to the current line.
    Collecting,
    /// Skipping the tail of an over-long line.
    Discarding,
}

/// Streaming line decoder.
#[derive(Debug)]
pub struct LineDecoder {
    state: DecoderState,
    max_len: usize,
    line: Vec<u8>,
    ready: VecDeque<DecodedLine>,
}

impl LineDecoder {
    pub fn new(max_len: usize) -> Self {
        Self {
            state: DecoderState::Collecting,
            max_len,
            line: Vec::new(),
            ready: VecDeque::new(),
        }
    }

    /// Feed bytes into the decoder.  Completed lines queue up for
    /// [`next_line`](Self::next_line).
    pub fn feed(&mut self, data: &[u8]) {
        for &byte in data {
            match self.state {
                DecoderState::Collecting if byte == b'\n' => {
                    let bytes = core::mem::take(&mut self.line);
                    self.ready.push_back(DecodedLine::Line(into_text(bytes)));
                }
                DecoderState::Collecting if self.line.len() == self.max_len => {
                    self.line.clear();
                    self.ready.push_back(DecodedLine::TooLong);
                    self.state = DecoderState::Discarding;
                }
                DecoderState::Collecting => self.line.push(byte),
                DecoderState::Discarding => {
                    if byte == b'\n' {
                        self.state = DecoderState::Collecting;
                    }
                }
            }
        }
    }

    /// Pop the oldest completed line.
    pub fn next_line(&mut self) -> Option<DecodedLine> {
        self.ready.pop_front()
    }

    /// Flush an unterminated final line at end of stream.
    pub fn finish(&mut self) -> Option<DecodedLine> {
        if self.state == DecoderState::Discarding || self.line.is_empty() {
            self.state = DecoderState::Collecting;
            self.line.clear();
            return None;
        }
        let bytes = core::mem::take(&mut self.line);
        Some(DecodedLine::Line(into_text(bytes)))
    }

    /// Drop all buffered state.
    pub fn reset(&mut self) {
        self.state = DecoderState::Collecting;
        self.line.clear();
        self.ready.clear();
    }
}

fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
