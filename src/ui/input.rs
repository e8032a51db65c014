//! Key bindings for the interactive form.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::export::ExportFormat;

/// What a key press asks the form to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    NextField,
    PrevField,
    /// Cycle a selector backwards
    Left,
    /// Cycle a selector forwards
    Right,
    Insert(char),
    Newline,
    Backspace,
    /// Clear the focused text field
    ClearField,
    /// Run a render cycle (assemble, auto-save, refresh history)
    Commit,
    Export(ExportFormat),
}

/// Map a key event to an action.
pub fn map_key(key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('s') => Action::Commit,
            KeyCode::Char('t') => Action::Export(ExportFormat::Text),
            KeyCode::Char('d') => Action::Export(ExportFormat::Markdown),
            KeyCode::Char('u') => Action::ClearField,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Tab | KeyCode::Down => Action::NextField,
        KeyCode::BackTab | KeyCode::Up => Action::PrevField,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Enter => Action::Newline,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) => Action::Insert(c),
        _ => Action::None,
    }
}

/// One-line key help shown at the bottom of the form.
pub const KEY_HELP: &str = "Tab/Shift-Tab move  ←/→ choose  Space toggle  Ctrl-S generate  \
     Ctrl-T save .txt  Ctrl-D save .md  Ctrl-U clear  Esc quit";

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_characters_insert() {
        assert_eq!(map_key(key(KeyCode::Char('a'), KeyModifiers::NONE)), Action::Insert('a'));
        assert_eq!(map_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT)), Action::Insert('A'));
        assert_eq!(map_key(key(KeyCode::Char(' '), KeyModifiers::NONE)), Action::Insert(' '));
    }

    #[test]
    fn control_chords() {
        assert_eq!(map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Quit);
        assert_eq!(map_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL)), Action::Commit);
        assert_eq!(
            map_key(key(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            Action::Export(ExportFormat::Text)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Action::Export(ExportFormat::Markdown)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)), Action::None);
    }

    #[test]
    fn navigation() {
        assert_eq!(map_key(key(KeyCode::Tab, KeyModifiers::NONE)), Action::NextField);
        assert_eq!(map_key(key(KeyCode::BackTab, KeyModifiers::SHIFT)), Action::PrevField);
        assert_eq!(map_key(key(KeyCode::Esc, KeyModifiers::NONE)), Action::Quit);
        assert_eq!(map_key(key(KeyCode::Enter, KeyModifiers::NONE)), Action::Newline);
    }

    #[test]
    fn releases_ignored() {
        let mut release = key(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), Action::None);
    }
}
