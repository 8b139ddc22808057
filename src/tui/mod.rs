pub mod bus;
pub mod input;
pub mod runtime;
pub mod status;
pub mod ui;

use std::io::{self, Stdout};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::Config;
use bus::{Bus, CoreToUi, UiToCore};

/// Start the console: spawn the core and input threads, run the render loop
/// on the calling thread, and tear everything down on quit.
pub fn start(config: Config) -> Result<()> {
    log::info!("[tui] collecte TUI starting...");

    status::init_status()?;

    let (core_tx, core_rx) = flume::unbounded::<CoreToUi>();
    let (ui_tx, ui_rx) = flume::unbounded::<UiToCore>();
    let bus = Bus::new(core_rx, ui_tx.clone());

    let (input_kill_tx, input_kill_rx) = flume::bounded::<()>(1);

    let core_handle = thread::spawn({
        let core_tx = core_tx.clone();
        let input_kill_tx = input_kill_tx.clone();
        move || runtime::run_core_thread(config, ui_rx, core_tx, input_kill_tx)
    });

    let input_handle = thread::spawn({
        let bus = bus.clone();
        move || input::run_input_thread(bus, input_kill_rx)
    });

    let render_result = run_render_loop(&bus);

    // Normally the render loop exits because the core announced Quit. If it
    // exited on its own error, ask the core to shut down too.
    let _ = ui_tx.send(UiToCore::Quit);

    core_handle
        .join()
        .map_err(|err| anyhow!("failed to join core thread: {err:?}"))??;

    let _ = input_kill_tx.try_send(());
    input_handle
        .join()
        .map_err(|err| anyhow!("failed to join input thread: {err:?}"))??;

    render_result
}

fn run_render_loop(bus: &Bus) -> Result<()> {
    // Setup terminal
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = render_loop(&mut terminal, bus);

    // Restore terminal even when rendering failed.
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();

    res
}

fn render_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, bus: &Bus) -> Result<()> {
    loop {
        match bus.core_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(CoreToUi::Quit) => break,
            Ok(_) => {}
            Err(flume::RecvTimeoutError::Timeout) => {}
            Err(flume::RecvTimeoutError::Disconnected) => break,
        }

        let snapshot = status::read_status(|status| Ok(status.clone()))?;
        terminal.draw(|frame| ui::render_ui(frame, &snapshot))?;
    }

    terminal.clear()?;
    Ok(())
}
