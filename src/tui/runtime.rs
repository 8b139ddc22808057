//! Core worker thread.
//!
//! Owns the console (and through it the HTTP client), so every backend call
//! runs here and rapid double-scans serialize through the message queue.
//! Also runs the two independent periodic behaviors (scale polling and
//! entry-focus restoration) and expires transient error state.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::Local;

use crate::api::{ApiClient, Backend};
use crate::config::Config;
use crate::console::{Console, Feedback};
use crate::tui::bus::{CoreToUi, UiToCore};
use crate::tui::status::{write_status, PanelFocus, ERROR_BANNER_TTL};

pub fn run_core_thread(
    config: Config,
    ui_rx: flume::Receiver<UiToCore>,
    core_tx: flume::Sender<CoreToUi>,
    input_kill_tx: flume::Sender<()>,
) -> Result<()> {
    let mut console = Console::new(ApiClient::new(&config.server_url));

    if console.ping() {
        log::info!("[core] backend reachable at {}", config.server_url);
    }

    // A fresh session opens on today's entries.
    match console.show_today_only() {
        Ok(count) => log::info!("[core] starting with {count} entries for today"),
        Err(err) => log::warn!("[core] initial fetch failed: {err}"),
    }
    project(&console)?;

    let scale_interval = Duration::from_millis(config.scale_poll_ms.max(100));
    let focus_interval = Duration::from_millis(config.focus_return_ms.max(100));
    // Immediately eligible on the first loop iteration.
    let mut last_scale_poll = Instant::now() - scale_interval;

    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            match msg {
                UiToCore::Quit => {
                    log::info!("[core] received quit signal");
                    console.shutdown();
                    if let Err(err) = input_kill_tx.send(()) {
                        log::warn!("[core] failed to send input kill signal: {err}");
                    }
                    core_tx
                        .send(CoreToUi::Quit)
                        .map_err(|err| anyhow!("failed to send Quit to UI: {err}"))?;
                    return Ok(());
                }
                UiToCore::Refresh => {
                    core_tx
                        .send(CoreToUi::Refreshed)
                        .map_err(|err| anyhow!("failed to send Refreshed: {err}"))?;
                }
                UiToCore::Submit(text) => handle_submit(&mut console, &text, &core_tx)?,
                UiToCore::Delete(id) => handle_delete(&mut console, id, &core_tx)?,
                UiToCore::FetchEntries => {
                    let outcome = console.refresh();
                    finish_table_operation(&console, outcome, &core_tx)?;
                }
                UiToCore::ToggleHistory => {
                    let outcome = console.toggle_history_filter();
                    finish_table_operation(&console, outcome, &core_tx)?;
                }
                UiToCore::Export => handle_export(&console, &config, &core_tx)?,
            }
        }

        // Scale polling: independent of operator pacing; a failed tick is
        // dropped and the previous weight stays on display.
        if last_scale_poll.elapsed() >= scale_interval {
            last_scale_poll = Instant::now();
            if let Some(reading) = console.poll_scale() {
                write_status(|status| {
                    status.weight = reading.value;
                    status.stable = reading.stable;
                    Ok(())
                })?;
            }
        }

        // Focus restoration and transient-state expiry.
        write_status(|status| {
            if status.focus == PanelFocus::Table
                && status.last_interaction.elapsed() >= focus_interval
            {
                status.focus = PanelFocus::Entry;
            }

            if let Some(error) = &status.error {
                let expired = Local::now()
                    .signed_duration_since(error.timestamp)
                    .to_std()
                    .map(|age| age >= ERROR_BANNER_TTL)
                    .unwrap_or(false);
                if expired {
                    status.error = None;
                }
            }

            if let Some(until) = status.flash_until {
                if Instant::now() >= until {
                    status.flash_until = None;
                }
            }
            Ok(())
        })?;

        core_tx
            .send(CoreToUi::Tick)
            .map_err(|err| anyhow!("failed to send Tick: {err}"))?;
        thread::sleep(Duration::from_millis(50));
    }
}

fn handle_submit<B: Backend>(
    console: &mut Console<B>,
    text: &str,
    core_tx: &flume::Sender<CoreToUi>,
) -> Result<()> {
    match console.submit(text) {
        Feedback::Accepted => {
            write_status(|status| {
                status.entry.clear();
                Ok(())
            })?;
            project(console)?;
            core_tx
                .send(CoreToUi::Refreshed)
                .map_err(|err| anyhow!(err))?;
        }
        Feedback::Ignored => {
            core_tx
                .send(CoreToUi::Refreshed)
                .map_err(|err| anyhow!(err))?;
        }
        Feedback::Error(message) => {
            write_status(|status| {
                status.flash_entry();
                if let Some(message) = message {
                    status.set_error(message);
                }
                Ok(())
            })?;
            project(console)?;
            core_tx.send(CoreToUi::Error).map_err(|err| anyhow!(err))?;
        }
    }
    Ok(())
}

fn handle_delete<B: Backend>(
    console: &mut Console<B>,
    id: u64,
    core_tx: &flume::Sender<CoreToUi>,
) -> Result<()> {
    match console.delete_item(id) {
        Ok(()) => {
            log::info!("[core] entry {id} deleted");
            project(console)?;
            core_tx
                .send(CoreToUi::Refreshed)
                .map_err(|err| anyhow!(err))?;
        }
        Err(err) => {
            // The row stays: no optimistic removal, no automatic resync.
            write_status(|status| {
                status.set_error(format!("delete failed: {err}"));
                Ok(())
            })?;
            core_tx.send(CoreToUi::Error).map_err(|err| anyhow!(err))?;
        }
    }
    Ok(())
}

fn finish_table_operation<B: Backend>(
    console: &Console<B>,
    outcome: crate::api::ApiResult<usize>,
    core_tx: &flume::Sender<CoreToUi>,
) -> Result<()> {
    match outcome {
        Ok(_) => {
            project(console)?;
            core_tx
                .send(CoreToUi::Refreshed)
                .map_err(|err| anyhow!(err))?;
        }
        Err(err) => {
            write_status(|status| {
                status.set_error(format!("fetch failed: {err}"));
                Ok(())
            })?;
            project(console)?;
            core_tx.send(CoreToUi::Error).map_err(|err| anyhow!(err))?;
        }
    }
    Ok(())
}

fn handle_export<B: Backend>(
    console: &Console<B>,
    config: &Config,
    core_tx: &flume::Sender<CoreToUi>,
) -> Result<()> {
    match console.export() {
        Ok(attachment) => {
            let path = config.download_dir.join(&attachment.filename);
            match std::fs::write(&path, &attachment.bytes) {
                Ok(()) => {
                    log::info!(
                        "[core] export written to {} ({} bytes)",
                        path.display(),
                        attachment.bytes.len()
                    );
                    write_status(|status| {
                        status.notice = Some(format!("export: {}", path.display()));
                        Ok(())
                    })?;
                    core_tx
                        .send(CoreToUi::Refreshed)
                        .map_err(|err| anyhow!(err))?;
                }
                Err(err) => {
                    write_status(|status| {
                        status.set_error(format!("export write failed: {err}"));
                        Ok(())
                    })?;
                    core_tx.send(CoreToUi::Error).map_err(|err| anyhow!(err))?;
                }
            }
        }
        Err(err) => {
            write_status(|status| {
                status.set_error(format!("export failed: {err}"));
                Ok(())
            })?;
            core_tx.send(CoreToUi::Error).map_err(|err| anyhow!(err))?;
        }
    }
    Ok(())
}

/// Project the console's session and ledger into the status tree. Rendering
/// reads only that projection.
fn project<B: Backend>(console: &Console<B>) -> Result<()> {
    write_status(|status| {
        status.items = console.ledger.items().cloned().collect();
        status.last_provider = console.session.last_provider.clone();
        status.filter_date = console.session.filter_date;
        status.clamp_selection();
        Ok(())
    })
}
