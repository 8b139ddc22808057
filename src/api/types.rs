//! Wire types for the kiosk backend REST contract.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Latest reading reported by the scale endpoint.
///
/// `stable` is set once the scale has settled on a value; unstable readings
/// are still usable but are flagged in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScaleReading {
    pub value: f64,
    #[serde(default)]
    pub stable: bool,
}

/// Catalog entity resolved from a scanned code (provider or product).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub category: String,
}

/// One row of the session ledger, keyed by its backend-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub provider: String,
    pub product: String,
    #[serde(default)]
    pub category: String,
    pub quantity: i64,
    pub weight: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Local>>,
}

/// Payload for creating a new ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntry {
    pub provider: String,
    pub product: String,
    pub category: String,
    pub quantity: i64,
    pub weight: f64,
}

/// Backend acknowledgement for a created entry. The weight is authoritative:
/// the backend adjusts it for compostable goods.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CreatedEntry {
    pub id: u64,
    pub weight: f64,
}

/// Spreadsheet export downloaded from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Error payload the backend attaches to rejected submissions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub erreur: Option<String>,
}
