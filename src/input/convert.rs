//! Crossterm event conversion.
//!
//! Maps crossterm key codes to the string key names components match on.
//! Events with no counterpart here (mouse, focus, paste) are dropped.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers,
};

use super::keyboard::{InputEvent, KeyState, KeyboardEvent, Modifiers, ResizeEvent};

/// Convert any crossterm event the engine understands.
pub fn convert_event(event: CrosstermEvent) -> Option<InputEvent> {
    match event {
        CrosstermEvent::Key(key) => convert_key_event(key).map(InputEvent::Key),
        CrosstermEvent::Resize(width, height) => {
            Some(InputEvent::Resize(ResizeEvent { width, height }))
        }
        _ => None,
    }
}

/// Convert crossterm KeyEvent to our KeyboardEvent.
///
/// Returns `None` for keys without a name (`Null`, media keys, lone
/// modifier presses).
pub fn convert_key_event(event: CrosstermKeyEvent) -> Option<KeyboardEvent> {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Insert => "Insert".to_string(),
        _ => return None,
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    Some(KeyboardEvent {
        key,
        modifiers: convert_modifiers(event.modifiers),
        state,
    })
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    out.set(Modifiers::CTRL, mods.contains(KeyModifiers::CONTROL));
    out.set(Modifiers::ALT, mods.contains(KeyModifiers::ALT));
    out.set(Modifiers::SHIFT, mods.contains(KeyModifiers::SHIFT));
    out.set(Modifiers::META, mods.contains(KeyModifiers::META));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermKeyEvent {
        CrosstermKeyEvent::new(code, modifiers)
    }

    #[test_case(KeyCode::Char('x'), "x" ; "char")]
    #[test_case(KeyCode::Enter, "Enter" ; "enter")]
    #[test_case(KeyCode::Esc, "Escape" ; "escape")]
    #[test_case(KeyCode::Up, "ArrowUp" ; "arrow up")]
    #[test_case(KeyCode::F(5), "F5" ; "function key")]
    fn test_key_names(code: KeyCode, expected: &str) {
        let event = convert_key_event(key(code, KeyModifiers::NONE)).unwrap();
        assert_eq!(event.key, expected);
        assert!(event.is_press());
    }

    #[test]
    fn test_modifiers_convert() {
        let event = convert_key_event(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        ))
        .unwrap();
        assert_eq!(event.modifiers, Modifiers::CTRL | Modifiers::ALT);
    }

    #[test]
    fn test_unnamed_key_dropped() {
        assert!(convert_key_event(key(KeyCode::Null, KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn test_resize_converts() {
        assert_eq!(
            convert_event(CrosstermEvent::Resize(100, 40)),
            Some(InputEvent::Resize(ResizeEvent {
                width: 100,
                height: 40
            }))
        );
    }

    #[test]
    fn test_focus_dropped() {
        assert_eq!(convert_event(CrosstermEvent::FocusGained), None);
    }
}
