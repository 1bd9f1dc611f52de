use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

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
    // Ignore release/repeat events reported by some terminals
    if key.kind == KeyEventKind::Release {
        return;
    }

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

        // Direct view access
        KeyCode::Char(c @ '1'..='4') => {
            let index = (c as u8 - b'1') as usize;
            app.set_view(View::ALL[index]);
        }

        // Go back
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dashboard, Metric, Thresholds};
    use crate::processor::RecordProcessor;
    use crate::source::ChannelSource;
    use crate::ui::Theme;

    fn test_app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        let processor = RecordProcessor::new(Thresholds::default(), None);
        App::with_theme(Box::new(source), processor, Dashboard::default(), Theme::dark())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_number_keys_select_views() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_view, View::Single(Metric::AirQuality));
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_view, View::Overview);
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Single(Metric::Temperature));
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_view, View::Single(Metric::SoundLevel));
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }
}
