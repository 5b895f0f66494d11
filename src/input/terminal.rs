//! Conversion from crossterm key events.
//!
//! Terminals report characters rather than physical keys, so the physical
//! code is reconstructed assuming a US layout: `a`/`A` -> `KeyA`,
//! `1`/`!` -> `Digit1`, `-` -> `Minus` and so on.

use super::key::{KeyInput, Modifiers};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

fn code_for_char(c: char) -> String {
    if c.is_ascii_alphabetic() {
        return format!("Key{}", c.to_ascii_uppercase());
    }
    if c.is_ascii_digit() {
        return format!("Digit{c}");
    }
    let code = match c {
        ' ' => "Space",
        '!' => "Digit1",
        '@' => "Digit2",
        '#' => "Digit3",
        '$' => "Digit4",
        '%' => "Digit5",
        '^' => "Digit6",
        '&' => "Digit7",
        '*' => "Digit8",
        '(' => "Digit9",
        ')' => "Digit0",
        '-' | '_' => "Minus",
        '=' | '+' => "Equal",
        '[' | '{' => "BracketLeft",
        ']' | '}' => "BracketRight",
        '\\' | '|' => "Backslash",
        ';' | ':' => "Semicolon",
        '\'' | '"' => "Quote",
        ',' | '<' => "Comma",
        '.' | '>' => "Period",
        '/' | '?' => "Slash",
        '`' | '~' => "Backquote",
        _ => "Unidentified",
    };
    code.to_string()
}

fn modifier_key(code: ModifierKeyCode) -> (&'static str, &'static str) {
    match code {
        ModifierKeyCode::LeftShift => ("Shift", "ShiftLeft"),
        ModifierKeyCode::RightShift => ("Shift", "ShiftRight"),
        ModifierKeyCode::LeftControl => ("Control", "ControlLeft"),
        ModifierKeyCode::RightControl => ("Control", "ControlRight"),
        ModifierKeyCode::LeftAlt => ("Alt", "AltLeft"),
        ModifierKeyCode::RightAlt => ("Alt", "AltRight"),
        ModifierKeyCode::LeftSuper => ("Super", "MetaLeft"),
        ModifierKeyCode::RightSuper => ("Super", "MetaRight"),
        ModifierKeyCode::LeftMeta => ("Meta", "MetaLeft"),
        ModifierKeyCode::RightMeta => ("Meta", "MetaRight"),
        ModifierKeyCode::LeftHyper | ModifierKeyCode::RightHyper => ("Hyper", "Hyper"),
        ModifierKeyCode::IsoLevel3Shift => ("AltGraph", "AltRight"),
        ModifierKeyCode::IsoLevel5Shift => ("Shift", "IntlLevel5"),
    }
}

fn modifiers(flags: KeyModifiers) -> Modifiers {
    Modifiers {
        alt: flags.contains(KeyModifiers::ALT),
        ctrl: flags.contains(KeyModifiers::CONTROL),
        shift: flags.contains(KeyModifiers::SHIFT),
        meta: flags.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    }
}

impl From<&KeyEvent> for KeyInput {
    fn from(event: &KeyEvent) -> Self {
        let mods = modifiers(event.modifiers);
        let (key, code): (String, String) = match event.code {
            KeyCode::Char(c) => (c.to_string(), code_for_char(c)),
            KeyCode::Modifier(code) => {
                let (key, code) = modifier_key(code);
                (key.to_string(), code.to_string())
            }
            KeyCode::F(n) => (format!("F{n}"), format!("F{n}")),
            other => {
                let name = match other {
                    KeyCode::Backspace => "Backspace",
                    KeyCode::Enter => "Enter",
                    KeyCode::Left => "ArrowLeft",
                    KeyCode::Right => "ArrowRight",
                    KeyCode::Up => "ArrowUp",
                    KeyCode::Down => "ArrowDown",
                    KeyCode::Home => "Home",
                    KeyCode::End => "End",
                    KeyCode::PageUp => "PageUp",
                    KeyCode::PageDown => "PageDown",
                    KeyCode::Tab | KeyCode::BackTab => "Tab",
                    KeyCode::Delete => "Delete",
                    KeyCode::Insert => "Insert",
                    KeyCode::Esc => "Escape",
                    KeyCode::CapsLock => "CapsLock",
                    KeyCode::ScrollLock => "ScrollLock",
                    KeyCode::NumLock => "NumLock",
                    KeyCode::PrintScreen => "PrintScreen",
                    KeyCode::Pause => "Pause",
                    KeyCode::Menu => "ContextMenu",
                    _ => "Unidentified",
                };
                (name.to_string(), name.to_string())
            }
        };

        KeyInput::modifier(key, code).with_modifiers(mods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::encoding::encode;

    #[test]
    fn test_letters_map_to_physical_codes() {
        let event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        let input = KeyInput::from(&event);
        assert_eq!(input.code, "KeyS");
        assert_eq!(input.key, "s");
        assert_eq!(encode(&input).as_str(), "0000KeyS");

        let event = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT | KeyModifiers::CONTROL);
        assert_eq!(encode(&KeyInput::from(&event)).as_str(), "0110KeyS");
    }

    #[test]
    fn test_named_keys() {
        let event = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(KeyInput::from(&event).code, "Escape");
        let event = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(KeyInput::from(&event).code, "ArrowRight");
        let event = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(KeyInput::from(&event).code, "Space");
    }

    #[test]
    fn test_modifier_keys_are_modifier_only() {
        let event = KeyEvent::new(
            KeyCode::Modifier(ModifierKeyCode::LeftShift),
            KeyModifiers::SHIFT,
        );
        assert!(KeyInput::from(&event).is_modifier_only());
        let event = KeyEvent::new(KeyCode::CapsLock, KeyModifiers::NONE);
        assert!(KeyInput::from(&event).is_modifier_only());
    }
}
