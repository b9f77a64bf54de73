//! Turns raw payloads into stored inventory items.

use std::io;

use serde_tagged::Limits;
use tagged_schema::{Error, Schema};

use crate::audit::{Outcome, Preview, Status};
use crate::config::AuditConfig;
use crate::inventory::InventoryItem;
use crate::store::RecordSink;

/// The only message a payload's sender gets to see about a rejection.
pub const INVALID_DATA: &str = "invalid data";

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// The payload was malformed, disallowed, or didn't match the schema.
    ///
    /// The details are only in the audit log.
    #[error("invalid data")]
    Rejected,
    #[error("failed to store record")]
    Store(#[from] io::Error),
}

/// Decodes, validates, audits, and stores payloads.
#[derive(Debug)]
pub struct Intake<S> {
    limits: Limits,
    schema: Schema,
    audit: AuditConfig,
    sink: S,
}

impl<S: RecordSink> Intake<S> {
    pub fn new(limits: Limits, schema: Schema, audit: AuditConfig, sink: S) -> Self {
        Self {
            limits,
            schema,
            audit,
            sink,
        }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Builds the audit source name for a payload location.
    pub fn source(&self, location: &str) -> String {
        format!("{}:{location}", self.audit.source)
    }

    /// Handles a single payload.
    ///
    /// Every payload gets exactly one audit entry. Accepted items are passed
    /// to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Rejected`] if the payload is not acceptable and
    /// [`IntakeError::Store`] if the sink failed.
    pub fn handle(&self, source: &str, input: &[u8]) -> Result<InventoryItem, IntakeError> {
        let preview = Preview::new(input, self.audit.preview_len);

        let item = match self.accept(input) {
            Ok(item) => item,
            Err(err) => {
                let status = Status::Failure {
                    kind: err.kind(),
                    detail: err.to_string(),
                };

                Outcome::now(source, status, preview).log();
                return Err(IntakeError::Rejected);
            },
        };

        if let Err(why) = self.sink.store(&item) {
            let status = Status::Failure {
                kind: "store_failed",
                detail: why.to_string(),
            };

            Outcome::now(source, status, preview).log();
            return Err(why.into());
        }

        Outcome::now(source, Status::Success, preview).log();
        log::debug!("Stored {:?} from {source}", item.sku);
        Ok(item)
    }

    fn accept(&self, input: &[u8]) -> Result<InventoryItem, Error> {
        let record = tagged_schema::parse(input, self.limits, &self.schema)?;
        Ok(InventoryItem::try_from(&record)?)
    }
}
