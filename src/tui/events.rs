use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    /// Esc: cancel, close the open transcript, clear the search, then quit
    Back,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Open,
    ToggleFocus,
    ToggleSidechains,
    Refresh,
    RequestDelete,
    UpdateSearch(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

pub(crate) fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Back,

        // Navigation (Vim/Emacs style)
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Action::MoveDown,
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,

        (KeyCode::Enter, _) => Action::Open,
        (KeyCode::Tab, _) => Action::ToggleFocus,
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Action::ToggleSidechains,
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => Action::Refresh,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::RequestDelete,

        // Search input, also answers the delete confirmation
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::UpdateSearch(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}
