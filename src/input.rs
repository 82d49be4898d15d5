use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, ViewMode};
use crate::remote::AuthAction;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Clear status message on any key
    app.status_message = None;

    // Help overlay takes priority
    if app.show_help {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            app.show_help = false;
        }
        return;
    }

    // Detail popup takes priority
    if app.detail.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.close_detail();
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
        InputMode::Search => handle_search_input(app, key.code),
        InputMode::Timezone => handle_timezone_input(app, key.code),
        InputMode::Categories => handle_category_input(app, key.code),
        InputMode::SignIn => handle_sign_in_input(app, key.code, key.modifiers),
        InputMode::Form => handle_form_input(app, key.code),
    }
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::List,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Month,
        (KeyCode::Char('a'), _) => app.toggle_scope(),
        (KeyCode::Char('s'), _) => app.toggle_sort(),
        (KeyCode::Char('z'), _) => app.open_timezone_picker(),
        (KeyCode::Char('c'), _) => app.open_categories(),
        (KeyCode::Char('/'), _) => app.start_search(),
        (KeyCode::Esc, _) => app.finish_search(false),
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('r'), _) => app.load(),
        (KeyCode::Char('n'), _) => app.open_event_form(),
        (KeyCode::Char('i'), _) => app.open_sign_in(),
        (KeyCode::Char('o'), _) => app.sign_out(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        (KeyCode::Enter, _) => app.show_detail(),
        (KeyCode::Char('J'), _) => app.select_next_in_day(),
        (KeyCode::Char('K'), _) => app.select_prev_in_day(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => match app.view_mode {
            ViewMode::List => app.select_prev(),
            ViewMode::Month => app.prev_week(),
        },
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => match app.view_mode {
            ViewMode::List => app.select_next(),
            ViewMode::Month => app.next_week(),
        },
        _ => {}
    }
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.finish_search(false),
        KeyCode::Enter => app.finish_search(true),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) => app.search_input(c),
        _ => {}
    }
}

fn handle_timezone_input(app: &mut App, code: KeyCode) {
    let total = app
        .picker
        .as_ref()
        .map(|p| crate::calendar::timezone::search(&app.zones, &p.query).len())
        .unwrap_or(0);
    match code {
        KeyCode::Esc => app.close_timezone_picker(),
        KeyCode::Enter => app.confirm_timezone(),
        KeyCode::Up => move_picker(app, -1, total),
        KeyCode::Down => move_picker(app, 1, total),
        KeyCode::PageUp => move_picker(app, -10, total),
        KeyCode::PageDown => move_picker(app, 10, total),
        KeyCode::Backspace => {
            if let Some(ref mut picker) = app.picker {
                picker.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(ref mut picker) = app.picker {
                picker.input_char(c);
            }
        }
        _ => {}
    }
}

fn move_picker(app: &mut App, delta: isize, total: usize) {
    if let Some(ref mut picker) = app.picker {
        picker.move_by(delta, total);
    }
}

fn handle_category_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('c') => app.input_mode = InputMode::Normal,
        KeyCode::Up | KeyCode::Char('k') => app.move_category_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_category_cursor(1),
        KeyCode::Char(' ') => app.toggle_category_row(),
        KeyCode::Char('a') => app.set_all_categories(true),
        KeyCode::Char('u') => app.set_all_categories(false),
        _ => {}
    }
}

fn handle_sign_in_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.sign_in.as_ref().is_some_and(|f| f.is_busy()) {
        return;
    }
    match (code, modifiers) {
        (KeyCode::Esc, _) => app.close_sign_in(),
        (KeyCode::Enter, _) => app.submit_sign_in(AuthAction::SignIn),
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => app.submit_sign_in(AuthAction::Register),
        (KeyCode::Tab, _) | (KeyCode::BackTab, _) | (KeyCode::Up, _) | (KeyCode::Down, _) => {
            if let Some(ref mut form) = app.sign_in {
                form.active_field = form.active_field.toggle();
            }
        }
        (KeyCode::Backspace, _) => {
            if let Some(ref mut form) = app.sign_in {
                form.backspace();
            }
        }
        (KeyCode::Char(c), _) => {
            if let Some(ref mut form) = app.sign_in {
                form.input_char(c);
            }
        }
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    if app.form_state.as_ref().is_some_and(|f| f.submitting) {
        return;
    }
    match code {
        KeyCode::Esc => app.close_event_form(),
        KeyCode::Enter => app.submit_event_form(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Backspace | KeyCode::Char(_) => {
            if let Some(ref mut form) = app.form_state {
                match code {
                    KeyCode::Tab => form.active_field = form.active_field.next(),
                    KeyCode::BackTab => form.active_field = form.active_field.prev(),
                    KeyCode::Backspace => form.backspace(),
                    KeyCode::Char(c) => form.input_char(c),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
