//! Credential store adapters.
//!
//! Implements [`CredentialStore`] over the whitespace-separated record
//! format:
//!
//! ```text
//! # username  password  privilege
//! seth        zzz       15
//! bob         pw        1
//! ```
//!
//! Lookup is by exact, case-sensitive username; the first matching record
//! decides the outcome even if a later record has the right password.
//! Blank lines and `#` comments are ignored.  Malformed records are
//! skipped with a warning and never match.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{error, warn};

use crate::app::ports::{AuthError, CredentialStore};
use crate::protocol::auth::{PrivilegeLevel, passwords_match};

/// One `<username> <password> <privilege>` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
    pub level: PrivilegeLevel,
}

/// Why a record line could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    MissingField,
    BadPrivilege,
}

impl CredentialRecord {
    /// Parse one record.  `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>, RecordError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut fields = line.split_ascii_whitespace();
        let (Some(username), Some(password), Some(level)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(RecordError::MissingField);
        };
        let level = level.parse::<u8>().map_err(|_| RecordError::BadPrivilege)?;
        Ok(Some(Self {
            username: username.to_owned(),
            password: password.to_owned(),
            level: PrivilegeLevel::new(level),
        }))
    }

    /// Check `password` against this record.
    pub fn verify(&self, password: &str) -> Result<PrivilegeLevel, AuthError> {
        if passwords_match(&self.password, password) {
            Ok(self.level)
        } else {
            Err(AuthError::BadPassword)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// File-backed store
// ───────────────────────────────────────────────────────────────

/// Reads the credential file on every lookup, so edits apply without a
/// restart.  A missing or unreadable file rejects every user.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<PrivilegeLevel, AuthError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                error!("credentials: cannot open {}: {}", self.path.display(), e);
                return Err(AuthError::UnknownUser);
            }
        };

        // Raw bytes: a line that is not UTF-8 is skipped, never fatal.
        for (idx, line) in BufReader::new(file).split(b'\n').enumerate() {
            let bytes = match line {
                Ok(b) => b,
                Err(e) => {
                    error!("credentials: read error in {}: {}", self.path.display(), e);
                    break;
                }
            };
            let Ok(line) = core::str::from_utf8(&bytes) else {
                warn!(
                    "credentials: {}:{}: skipping line that is not UTF-8",
                    self.path.display(),
                    idx + 1
                );
                continue;
            };
            match CredentialRecord::parse(line) {
                Ok(Some(record)) if record.username == username => return record.verify(password),
                Ok(_) => {}
                Err(e) => warn!(
                    "credentials: {}:{}: skipping malformed record ({:?})",
                    self.path.display(),
                    idx + 1,
                    e
                ),
            }
        }
        Err(AuthError::UnknownUser)
    }
}

// ───────────────────────────────────────────────────────────────
// In-memory store
// ───────────────────────────────────────────────────────────────

/// Fixed record list, same first-match rule as the file store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    records: Vec<CredentialRecord>,
}

impl MemoryCredentialStore {
    pub fn new(records: Vec<CredentialRecord>) -> Self {
        Self { records }
    }

    /// Build from credential-file text, skipping malformed lines.
    pub fn parse(text: &str) -> Self {
        let records = text
            .lines()
            .filter_map(|l| CredentialRecord::parse(l).ok().flatten())
            .collect();
        Self { records }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<PrivilegeLevel, AuthError> {
        self.records
            .iter()
            .find(|r| r.username == username)
            .map_or(Err(AuthError::UnknownUser), |r| r.verify(password))
    }
}
