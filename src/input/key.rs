//! Key events as the menu engine sees them.
//!
//! A key event carries the logical key name (`key`, e.g. `"s"` or `"Shift"`),
//! the physical key code (`code`, e.g. `"KeyS"`) and four modifier flags.
//! Only the physical code takes part in keybinding encoding; the logical name
//! is used to recognise presses of a bare modifier key.

use std::fmt;
use std::str::FromStr;

/// Logical key names that are modifiers or locks on their own.
const MODIFIER_KEYS: &[&str] = &[
    "Alt",
    "AltGraph",
    "CapsLock",
    "Control",
    "Fn",
    "FnLock",
    "Hyper",
    "Meta",
    "NumLock",
    "ScrollLock",
    "Shift",
    "Super",
    "Symbol",
    "SymbolLock",
    "OS",
];

/// Physical codes that can never be captured as a custom keybinding.
const UNBINDABLE_CODES: &[&str] = &["Tab"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        shift: false,
        meta: false,
    };

    pub fn any(&self) -> bool {
        self.alt || self.ctrl || self.shift || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: String,
    pub code: String,
    pub modifiers: Modifiers,
}

impl KeyInput {
    /// A key press identified by its physical code, without modifiers.
    ///
    /// The logical key name is derived from the code (`KeyS` -> `s`,
    /// `Digit4` -> `4`, anything else unchanged).
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        let key = logical_key_for_code(&code);
        Self {
            key,
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// A press of a bare modifier key, e.g. `KeyInput::modifier("Shift", "ShiftLeft")`.
    pub fn modifier(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.modifiers.meta = true;
        self
    }

    /// True for presses of Shift, Control, CapsLock and friends on their own.
    pub fn is_modifier_only(&self) -> bool {
        MODIFIER_KEYS.contains(&self.key.as_str())
    }

    /// Whether this key may be captured as a custom keybinding.
    pub fn is_bindable(&self) -> bool {
        !UNBINDABLE_CODES.contains(&self.code.as_str())
    }
}

fn logical_key_for_code(code: &str) -> String {
    if let Some(letter) = code.strip_prefix("Key").filter(|rest| rest.len() == 1) {
        return letter.to_ascii_lowercase();
    }
    if let Some(digit) = code.strip_prefix("Digit").filter(|rest| rest.len() == 1) {
        return digit.to_string();
    }
    match code {
        "Space" => " ".to_string(),
        "ShiftLeft" | "ShiftRight" => "Shift".to_string(),
        "ControlLeft" | "ControlRight" => "Control".to_string(),
        "AltLeft" | "AltRight" => "Alt".to_string(),
        "MetaLeft" | "MetaRight" => "Meta".to_string(),
        _ => code.to_string(),
    }
}

/// Error returned when a textual key description cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError(String);

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid key description: {}", self.0)
    }
}

impl std::error::Error for ParseKeyError {}

/// Parse `"ctrl+shift+KeyS"`-style descriptions. Modifier names are
/// case-insensitive; the final segment is the physical code, kept verbatim.
impl FromStr for KeyInput {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let code = match parts.pop() {
            Some(code) if !code.is_empty() => code,
            _ => return Err(ParseKeyError(s.to_string())),
        };

        let mut modifiers = Modifiers::NONE;
        for part in parts {
            match part.to_lowercase().as_str() {
                "alt" | "option" => modifiers.alt = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "super" => modifiers.meta = true,
                _ => return Err(ParseKeyError(s.to_string())),
            }
        }

        Ok(KeyInput::new(code).with_modifiers(modifiers))
    }
}
