use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        KeyCode::Char('1') => app.set_view(View::Live),
        KeyCode::Char('2') => app.set_view(View::Map),
        KeyCode::Char('3') => app.set_view(View::History),

        // History navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Alert banner
        KeyCode::Esc | KeyCode::Char('x') => app.dismiss_alert(),

        KeyCode::Char('r') => app.reconnect(),

        // Charts
        KeyCode::Char('c') => app.clear_charts(),
        KeyCode::Char('m') => app.cycle_metric(),

        // Map
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') => app.zoom_out(),
        KeyCode::Char('p') => app.toggle_popup(),

        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = app.export_path.clone();
            match app.export_charts(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match (app.current_view, mouse.kind) {
        (View::History, MouseEventKind::ScrollUp) => app.select_prev(),
        (View::History, MouseEventKind::ScrollDown) => app.select_next(),
        (View::Map, MouseEventKind::ScrollUp) => app.zoom_in(),
        (View::Map, MouseEventKind::ScrollDown) => app.zoom_out(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dashboard;
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        App::with_theme(Box::new(source), Dashboard::default(), Theme::dark())
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_view_keys() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::History);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Live);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::History);
    }

    #[test]
    fn test_map_zoom_keys() {
        let mut app = test_app();
        let zoom = app.dashboard.map().view().zoom;

        handle_key_event(&mut app, key(KeyCode::Char('+')));
        assert_eq!(app.dashboard.map().view().zoom, zoom + 1);
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        assert_eq!(app.dashboard.map().view().zoom, zoom - 1);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = test_app();
        let mut event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        event.kind = KeyEventKind::Press;
        handle_key_event(&mut app, event);
        assert!(!app.running);
    }
}
