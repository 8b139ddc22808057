use flume::{Receiver, Sender};

/// Messages sent from the UI threads to the core worker thread.
#[derive(Debug)]
pub enum UiToCore {
    /// Redraw wake-up after a local state change (equivalent to a tick).
    Refresh,
    /// Submit the current entry buffer for barcode dispatch.
    Submit(String),
    /// Delete the line item with the given backend id.
    Delete(u64),
    /// Re-fetch the ledger from the backend.
    FetchEntries,
    /// Toggle between today-only and full-history views.
    ToggleHistory,
    /// Download the spreadsheet export.
    Export,
    /// Graceful shutdown request.
    Quit,
}

/// Messages sent from the core worker thread back to the render thread.
#[derive(Debug)]
pub enum CoreToUi {
    /// Core completed a cycle of background work; UI may redraw.
    Tick,
    /// State changed in response to an operator action; redraw sooner.
    Refreshed,
    /// A transient error was recorded in the status tree.
    Error,
    /// Core finished shutting down; the render loop should exit.
    Quit,
}

/// Holder passed into the UI loops containing the receiving side from core
/// and the sending side to core.
#[derive(Clone)]
pub struct Bus {
    pub core_rx: Receiver<CoreToUi>,
    pub ui_tx: Sender<UiToCore>,
}

impl Bus {
    pub fn new(core_rx: Receiver<CoreToUi>, ui_tx: Sender<UiToCore>) -> Self {
        Self { core_rx, ui_tx }
    }
}
