//! Input thread: keyboard events become `UiToCore` messages and entry
//! buffer edits.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::tui::{
    bus::{Bus, UiToCore},
    status::{read_status, write_status, PanelFocus},
};

/// Spawn target for the input handling thread. Exits on the kill signal.
pub fn run_input_thread(bus: Bus, kill_rx: flume::Receiver<()>) -> Result<()> {
    log::info!("[input] input thread started");
    loop {
        if let Ok(true) = crossterm::event::poll(Duration::from_millis(100)) {
            if let Ok(event) = crossterm::event::read() {
                handle_event(event, &bus)?;
            }
        }

        if kill_rx.try_recv().is_ok() {
            break;
        }
    }

    Ok(())
}

fn handle_event(event: crossterm::event::Event, bus: &Bus) -> Result<()> {
    if let crossterm::event::Event::Key(key) = event {
        handle_key_event(key, bus)?;
    }
    Ok(())
}

fn handle_key_event(key: KeyEvent, bus: &Bus) -> Result<()> {
    // Only the initial press maps to an action; repeat and release events
    // from a held key are ignored.
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    // Global quit: Ctrl+C or Esc.
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        bus.ui_tx.send(UiToCore::Quit).map_err(|err| anyhow!(err))?;
        return Ok(());
    }
    if matches!(key.code, KeyCode::Esc) {
        bus.ui_tx.send(UiToCore::Quit).map_err(|err| anyhow!(err))?;
        return Ok(());
    }

    write_status(|status| {
        status.last_interaction = Instant::now();
        Ok(())
    })?;

    // Function keys and focus toggle work regardless of panel focus.
    match key.code {
        KeyCode::F(5) => {
            bus.ui_tx
                .send(UiToCore::FetchEntries)
                .map_err(|err| anyhow!(err))?;
            return Ok(());
        }
        KeyCode::F(6) => {
            bus.ui_tx
                .send(UiToCore::ToggleHistory)
                .map_err(|err| anyhow!(err))?;
            return Ok(());
        }
        KeyCode::F(8) => {
            bus.ui_tx.send(UiToCore::Export).map_err(|err| anyhow!(err))?;
            return Ok(());
        }
        KeyCode::Tab => {
            write_status(|status| {
                status.focus = match status.focus {
                    PanelFocus::Entry => PanelFocus::Table,
                    PanelFocus::Table => PanelFocus::Entry,
                };
                status.clamp_selection();
                Ok(())
            })?;
            bus.ui_tx
                .send(UiToCore::Refresh)
                .map_err(|err| anyhow!(err))?;
            return Ok(());
        }
        _ => {}
    }

    let focus = read_status(|status| Ok(status.focus))?;
    match focus {
        PanelFocus::Entry => handle_entry_key(key, bus),
        PanelFocus::Table => handle_table_key(key, bus),
    }
}

fn handle_entry_key(key: KeyEvent, bus: &Bus) -> Result<()> {
    match key.code {
        KeyCode::Char(c) => {
            write_status(|status| {
                status.entry.push(c);
                Ok(())
            })?;
        }
        KeyCode::Backspace => {
            write_status(|status| {
                status.entry.pop();
                Ok(())
            })?;
        }
        KeyCode::Enter => {
            // The buffer is cleared by the core thread, and only when the
            // scan was accepted; a failed scan stays visible under the flash.
            let text = read_status(|status| Ok(status.entry.clone()))?;
            bus.ui_tx
                .send(UiToCore::Submit(text))
                .map_err(|err| anyhow!(err))?;
            return Ok(());
        }
        _ => return Ok(()),
    }

    bus.ui_tx
        .send(UiToCore::Refresh)
        .map_err(|err| anyhow!(err))?;
    Ok(())
}

fn handle_table_key(key: KeyEvent, bus: &Bus) -> Result<()> {
    match key.code {
        KeyCode::Up => {
            write_status(|status| {
                status.selected = status.selected.saturating_sub(1);
                Ok(())
            })?;
        }
        KeyCode::Down => {
            write_status(|status| {
                if status.selected + 1 < status.items.len() {
                    status.selected += 1;
                }
                Ok(())
            })?;
        }
        KeyCode::Delete | KeyCode::Char('d') => {
            let selected = read_status(|status| Ok(status.selected_item().map(|item| item.id)))?;
            if let Some(id) = selected {
                bus.ui_tx
                    .send(UiToCore::Delete(id))
                    .map_err(|err| anyhow!(err))?;
            }
            return Ok(());
        }
        _ => return Ok(()),
    }

    bus.ui_tx
        .send(UiToCore::Refresh)
        .map_err(|err| anyhow!(err))?;
    Ok(())
}
