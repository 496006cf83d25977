//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The network side lives in the
//! widget; this driver never talks to the VPN service.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::time::Instant;
use voltvpn_app::{Dashboard, DashboardEvent, Driver, KeyInput};

use crate::ui;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Puts the terminal in raw mode on the alternate screen for its lifetime
/// and restores it on drop.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    restored: bool,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, restored: false })
    }

    /// Convert a crossterm key press to `KeyInput`.
    ///
    /// Ctrl+C quits like Esc; raw mode would otherwise deliver it as `c`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c')).then_some(KeyInput::Esc);
        }
        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<DashboardEvent<Instant>>, Self::Error> {
        match self.event_stream.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                Ok(Self::convert_key(key).map(DashboardEvent::Key))
            },
            Some(Ok(Event::Resize(cols, rows))) => Ok(Some(DashboardEvent::Resize(cols, rows))),
            Some(Ok(_)) => Ok(None),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            // Input closed.
            None => Ok(Some(DashboardEvent::Key(KeyInput::Esc))),
        }
    }

    fn render(&mut self, dashboard: &Dashboard<Instant>) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, dashboard);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.restore();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn keys_map_to_dashboard_input() {
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('b'), KeyModifiers::NONE)),
            Some(KeyInput::Char('b'))
        );
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Down, KeyModifiers::NONE)),
            Some(KeyInput::Down)
        );
        assert_eq!(TerminalDriver::convert_key(press(KeyCode::Tab, KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_c_quits_instead_of_connecting() {
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyInput::Esc)
        );
        assert_eq!(
            TerminalDriver::convert_key(press(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            None
        );
    }
}
