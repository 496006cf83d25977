//! Terminal-agnostic keyboard input.

/// Keyboard input abstraction.
///
/// Decouples the dashboard from terminal libraries so the simulation driver
/// can script key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (connect to selection).
    Enter,
    /// Escape key (quit).
    Esc,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (first server).
    Home,
    /// End key (last server).
    End,
}
