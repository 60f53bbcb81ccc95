//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  In search mode every
//! printable key goes to the search box; otherwise keys are commands.
//! Anything that must happen outside the app (opening a browser) comes back
//! as a [`Command`] for the main loop.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, InputMode, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenLink(String),
}

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return None;
    }

    match app.input_mode {
        InputMode::Search => {
            handle_search_key(app, key, now);
            None
        }
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter => app.search_submit(),
        KeyCode::Esc => app.search_cancel(),
        KeyCode::Backspace => app.search_pop(now),
        KeyCode::Char(c) => app.search_push(c, now),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Tab => app.next_view(),
        KeyCode::Char('1') => app.switch_view(View::Feed),
        KeyCode::Char('2') => app.switch_view(View::Trending),
        KeyCode::Char('3') => app.switch_view(View::Favorites),
        KeyCode::Char('4') => app.switch_view(View::Settings),
        KeyCode::Char('n') => app.load_more(),
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('/') => app.begin_search(),
        KeyCode::Char('f') => app.toggle_favorite(),
        KeyCode::Char('x') => app.remove_selected_favorite(),
        KeyCode::Char('J') => app.move_selected(true),
        KeyCode::Char('K') => app.move_selected(false),
        KeyCode::Char(' ') => app.toggle_selected_category(),
        KeyCode::Char('s') => app.save_settings(),
        KeyCode::Char('d') => app.toggle_dark_mode(),
        KeyCode::Char('o') | KeyCode::Enter => {
            return app.selected_link().map(Command::OpenLink);
        }
        _ => {}
    }
    None
}
