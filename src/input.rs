//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] mutations, or to an [`Action`] that
//! the main loop forwards to the async side.  Adding a new keybinding is a
//! single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] (or an [`Action`] variant) for it.
//! 2. Add a `KeyCode` match arm in [`handle_key_event`].
//! 3. Update the help text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{Action, App};

/// Process a single key event.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc if app.detail.is_some() => app.close_detail(),
        KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') => app.close_detail(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('m') | KeyCode::Char(' ') => return Some(Action::LoadMore),
        KeyCode::Enter if app.detail.is_none() => return app.open_selected(),
        _ => {}
    }
    None
}
