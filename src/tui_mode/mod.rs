pub mod app;
mod helpers;
mod ui;

use anyhow::Result;
use app::App;
use calcipro::calc_engine::AngleMode;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    execute,
    cursor::{SetCursorStyle, Show},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;


pub(crate) fn run_tui(angle_mode: AngleMode) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(angle_mode);
    info!(angle_mode = angle_mode.label(), "starting terminal UI");

    // Restore the terminal even when the loop fails.
    let outcome = ui::run_ui_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    outcome
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, SetCursorStyle::BlinkingBar)?;
    Terminal::new(CrosstermBackend::new(stdout)).map_err(Into::into)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show, SetCursorStyle::DefaultUserShape)?;
    Ok(())
}
