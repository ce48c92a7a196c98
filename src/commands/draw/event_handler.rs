use crossterm::event::{KeyCode, KeyModifiers};

/// What a key press asks the draw screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Exit the screen
    Quit,
    /// Start the reveal animation
    Draw,
    /// Move the admin cursor up
    CursorUp,
    /// Move the admin cursor down
    CursorDown,
    /// Toggle the lock on the selected step
    ToggleLock,
    /// Key not bound to anything
    Ignore,
}

/// Map a key press to an action. Pure so it can be tested without a
/// terminal.
pub fn handle_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Draw,
        KeyCode::Up | KeyCode::Char('k') => KeyAction::CursorUp,
        KeyCode::Down | KeyCode::Char('j') => KeyAction::CursorDown,
        KeyCode::Char('u') => KeyAction::ToggleLock,
        _ => KeyAction::Ignore,
    }
}
