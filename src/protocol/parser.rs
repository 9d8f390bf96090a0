//! Command-line tokenizer and token mappers.
//!
//! ```text
//! auth <user> <password> <command> [args...]
//!  [0]   [1]     [2]        [3]      [4..]
//! ```
//!
//! Tokens are split on ASCII whitespace and capped at [`MAX_TOKENS`];
//! anything past the cap is dropped without error.
//!
//! Command and register tokens are resolved by name first and then by
//! integer id.  Under [`ParseMode::Legacy`] the integer fallback behaves
//! like C `atoi`: the longest leading digit run is used and a token with
//! no digits reads as `0`.  So `auth u p bogus` runs `nop`, and
//! `set bogus 5` writes register 0.  [`ParseMode::Strict`] rejects those
//! tokens instead.

use serde::{Deserialize, Serialize};

use crate::app::commands::CommandKind;
use crate::registers::{Register, RegisterId};

/// Maximum tokens kept from one line.
pub const MAX_TOKENS: usize = 16;

/// `auth`, user, password and a command.
pub const MIN_TOKENS: usize = 4;

/// Literal first token of every line.
pub const AUTH_PREAMBLE: &str = "auth";

/// Token list borrowed from the input line.
pub type Tokens<'a> = heapless::Vec<&'a str, MAX_TOKENS>;

/// Treatment of unparsable numeric tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Unparsable tokens read as 0 (wire-compatible behaviour).
    #[default]
    Legacy,
    /// Unparsable tokens are rejected.
    Strict,
}

/// Split a line into at most [`MAX_TOKENS`] whitespace-separated tokens.
pub fn tokenize(line: &str) -> Tokens<'_> {
    let mut tokens = Tokens::new();
    for token in line.split(is_separator).filter(|t| !t.is_empty()) {
        if tokens.push(token).is_err() {
            break;
        }
    }
    tokens
}

/// Space, tab, newline, carriage return, vertical tab, form feed.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

/// Resolve a command token.  `None` means the command is unknown.
pub fn command_of(token: &str, mode: ParseMode) -> Option<CommandKind> {
    match token {
        "nop" => Some(CommandKind::Nop),
        "exit" => Some(CommandKind::Exit),
        "set" => Some(CommandKind::SetVariable),
        _ => integer_of(token, mode).and_then(CommandKind::from_id),
    }
}

/// Resolve a register token to an id.  Integer ids wrap to one byte.
pub fn register_of(token: &str, mode: ParseMode) -> Option<RegisterId> {
    if let Some(reg) = Register::from_name(token) {
        return Some(reg.id());
    }
    byte_of(token, mode)
}

/// Parse a register value.  Wraps to one byte in legacy mode.
pub fn value_of(token: &str, mode: ParseMode) -> Option<u8> {
    byte_of(token, mode)
}

fn byte_of(token: &str, mode: ParseMode) -> Option<u8> {
    match mode {
        ParseMode::Legacy => Some(atoi(token).unwrap_or(0) as u8),
        ParseMode::Strict => token.parse::<u8>().ok(),
    }
}

fn integer_of(token: &str, mode: ParseMode) -> Option<i64> {
    match mode {
        ParseMode::Legacy => Some(atoi(token).unwrap_or(0)),
        ParseMode::Strict => token.parse::<i64>().ok(),
    }
}

/// C-style `atoi`: leading whitespace, optional sign, then digits.
///
/// Returns `None` when no digit follows; overflow wraps.
pub fn atoi(token: &str) -> Option<i64> {
    let s = token.trim_start_matches(is_separator);
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut seen = false;
    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        n = n.wrapping_mul(10).wrapping_add(i64::from(b - b'0'));
    }
    seen.then(|| if negative { n.wrapping_neg() } else { n })
}
