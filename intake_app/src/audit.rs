//! Structured audit entries for every processed payload.
//!
//! Entries are logged as a single JSON object under the [`TARGET`] log
//! target, so the log configuration can route them separately.

use log::Level;
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use time::OffsetDateTime;

pub const TARGET: &str = "intake::audit";

/// The audit entry for one payload.
#[derive(Debug, Serialize)]
pub struct Outcome<'a> {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub source: &'a str,
    pub status: Status,
    pub input_preview: Preview,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure {
        /// Stable label of the failure, such as `disallowed_type`.
        kind: &'static str,
        detail: String,
    },
}

/// Identifies a payload without logging all of it.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Preview {
    /// Hex-encoded SHA-256 of the whole payload.
    pub sha256: String,
    /// Length of the whole payload in bytes.
    pub len: usize,
    /// The first bytes, escaped to printable ASCII. Ends in `…` if cut off.
    pub head: String,
}

impl Preview {
    pub fn new(input: &[u8], max_len: usize) -> Self {
        let (head, rest) = input.split_at(input.len().min(max_len));

        let mut text = head.escape_ascii().to_string();
        if !rest.is_empty() {
            text.push('…');
        }

        Self {
            sha256: hex::encode(Sha256::digest(input)),
            len: input.len(),
            head: text,
        }
    }
}

impl<'a> Outcome<'a> {
    /// Creates an entry stamped with the current time.
    pub fn now(source: &'a str, status: Status, input_preview: Preview) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            source,
            status,
            input_preview,
        }
    }

    pub const fn level(&self) -> Level {
        match self.status {
            Status::Success => Level::Info,
            Status::Failure { .. } => Level::Warn,
        }
    }

    /// Writes the entry to the audit log.
    pub fn log(&self) {
        match serde_json::to_string(self) {
            Ok(json) => log::log!(target: TARGET, self.level(), "{json}"),
            Err(why) => log::error!("Cannot serialize audit entry for {}: {why}", self.source),
        }
    }
}
