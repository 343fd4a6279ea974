use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{debug, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use torus_snake::game::BoardSnapshot;

use super::renderer;

static PANIC_HOOK: Once = Once::new();

/// Owns the alternate screen for as long as the game is on screen.
///
/// Dropping the session puts the terminal back the way it was found. A panic
/// while the session is alive restores the terminal before the panic message
/// is printed.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        PANIC_HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                let _ = leave_screen();
                previous(info);
            }));
        });

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = leave_screen();
            return Err(error);
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(error) => {
                let _ = leave_screen();
                return Err(error);
            }
        };
        debug!("terminal session entered");
        Ok(Self { terminal })
    }

    /// Draws `snapshot`, or a waiting screen when no board has arrived yet.
    pub fn draw(&mut self, snapshot: Option<&BoardSnapshot>) -> io::Result<()> {
        self.terminal
            .draw(|frame| renderer::render(frame, snapshot))
            .map(|_| ())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        match leave_screen() {
            Ok(()) => debug!("terminal session restored"),
            Err(error) => warn!("failed to restore terminal: {error}"),
        }
    }
}

fn leave_screen() -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    raw
}
