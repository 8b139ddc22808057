//! Global TUI status tree.
//!
//! The render thread draws a snapshot of this structure; the input and core
//! threads mutate it through the `read_status`/`write_status` helpers. The
//! tree is a pure projection target: the console owns the authoritative
//! session and ledger on the core thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::api::LineItem;

/// How long the transient error banner stays visible.
pub const ERROR_BANNER_TTL: Duration = Duration::from_millis(2000);

/// How long the entry field flashes after a failed scan.
pub const ENTRY_FLASH_TTL: Duration = Duration::from_millis(500);

/// Which panel currently receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Entry,
    Table,
}

/// Transient error shown in the banner.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub message: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct Status {
    /// Latest scale value, in kilograms.
    pub weight: f64,
    /// Whether the scale reported the value as settled.
    pub stable: bool,
    pub last_provider: Option<String>,
    pub filter_date: Option<NaiveDate>,
    /// Ledger rows in display order (front first).
    pub items: Vec<LineItem>,
    pub focus: PanelFocus,
    /// Selected row index when the table has focus.
    pub selected: usize,
    /// Entry field buffer.
    pub entry: String,
    /// Entry field flashes red until this deadline.
    pub flash_until: Option<Instant>,
    pub error: Option<ErrorInfo>,
    /// Sticky informational line (e.g. where the last export landed).
    pub notice: Option<String>,
    /// Last operator keystroke, for the focus-return timer.
    pub last_interaction: Instant,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            weight: 0.0,
            stable: false,
            last_provider: None,
            filter_date: None,
            items: Vec::new(),
            focus: PanelFocus::Entry,
            selected: 0,
            entry: String::new(),
            flash_until: None,
            error: None,
            notice: None,
            last_interaction: Instant::now(),
        }
    }
}

impl Status {
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(ErrorInfo {
            message: message.into(),
            timestamp: Local::now(),
        });
    }

    pub fn flash_entry(&mut self) {
        self.flash_until = Some(Instant::now() + ENTRY_FLASH_TTL);
    }

    pub fn selected_item(&self) -> Option<&LineItem> {
        self.items.get(self.selected)
    }

    /// Keep the selection inside the table after rows were added or removed.
    pub fn clamp_selection(&mut self) {
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }
}

/// Global status instance.
static STATUS: OnceCell<Arc<RwLock<Status>>> = OnceCell::new();

/// Initialize the status tree. Called once at application startup.
pub fn init_status() -> Result<()> {
    STATUS
        .set(Arc::new(RwLock::new(Status::default())))
        .map_err(|_| anyhow!("status tree already initialized"))
}

fn status_cell() -> Result<&'static Arc<RwLock<Status>>> {
    STATUS
        .get()
        .ok_or_else(|| anyhow!("status tree not initialized"))
}

/// Read-only accessor for the status tree.
pub fn read_status<R, F>(f: F) -> Result<R>
where
    F: FnOnce(&Status) -> Result<R>,
{
    let cell = status_cell()?;
    let guard = cell.read();
    f(&guard)
}

/// Write accessor for the status tree.
pub fn write_status<R, F>(f: F) -> Result<R>
where
    F: FnOnce(&mut Status) -> Result<R>,
{
    let cell = status_cell()?;
    let mut guard = cell.write();
    f(&mut guard)
}
