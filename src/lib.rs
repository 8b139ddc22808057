//! Collecte: barcode weigh-in entry console for the Bouffe Action kiosk.
//!
//! An operator scans barcodes into an always-focused entry field; the
//! console resolves them against the backend catalog over REST, reads the
//! live scale weight, and posts line items to the server-side ledger while
//! keeping an on-screen table synchronized with it.
//!
//! The `console` module holds the dispatch and table-synchronization logic,
//! `api` the typed REST client, and `tui` the terminal frontend. The boot
//! helpers are hidden from the generated documentation.

pub mod api;
#[doc(hidden)]
pub mod boot;
pub mod config;
pub mod console;
#[doc(hidden)]
pub mod tui;
