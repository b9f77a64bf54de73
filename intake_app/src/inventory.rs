use serde::Serialize;
use tagged_schema::{FieldKind, Reason, Record, ValidationError};

/// An accepted inventory entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub sku: String,
    pub name: String,
    pub quantity: u64,
    pub price: f64,
}

impl TryFrom<&Record> for InventoryItem {
    type Error = ValidationError;

    /// Projects a validated record.
    ///
    /// The configured schema decides what the record holds, so a schema that
    /// doesn't provide these fields with the right kinds is reported the same
    /// way as a payload that doesn't.
    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let text = |name: &str| {
            record
                .text(name)
                .map(str::to_owned)
                .ok_or_else(|| missing(record, name, FieldKind::String))
        };

        let quantity = record
            .int("quantity")
            .ok_or_else(|| missing(record, "quantity", FieldKind::Int))?;
        let quantity = u64::try_from(quantity)
            .map_err(|_| ValidationError::new("quantity", Reason::Negative))?;

        let price = record
            .float("price")
            .ok_or_else(|| missing(record, "price", FieldKind::Number))?;

        Ok(Self {
            sku: text("sku")?,
            name: text("name")?,
            quantity,
            price,
        })
    }
}

fn missing(record: &Record, name: &str, expected: FieldKind) -> ValidationError {
    let reason = match record.get(name) {
        None => Reason::Missing,
        Some(field) => Reason::WrongKind {
            expected,
            found: field.kind(),
        },
    };

    ValidationError::new(name, reason)
}
