//! Canonical keybinding encoding.
//!
//! A key event is encoded as four binary modifier flags in the fixed order
//! alt, ctrl, shift, meta followed by the physical key code, e.g. `"0101KeyS"`
//! for Ctrl+Meta+S. The string doubles as a map key in the keybinding registry
//! and as the source for the human readable label.
//!
//! The code is stored unmodified, so two events whose codes differ only in
//! case encode differently.

use super::key::{KeyInput, Modifiers};
use serde::{Deserialize, Serialize};
use std::fmt;

const FLAG_COUNT: usize = 4;

/// Encoded modifier+code combination, e.g. `"0000KeyS"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedKeybinding(String);

impl EncodedKeybinding {
    /// Wrap an already encoded string without validating it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Option<DecodedKeybinding> {
        decode(&self.0)
    }

    pub fn display_label(&self) -> String {
        display_label(&self.0)
    }
}

impl fmt::Display for EncodedKeybinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five components an encoded keybinding is made of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodedKeybinding {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
    pub code: String,
}

impl DecodedKeybinding {
    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            alt: self.alt,
            ctrl: self.ctrl,
            shift: self.shift,
            meta: self.meta,
        }
    }
}

fn flag(set: bool) -> char {
    if set {
        '1'
    } else {
        '0'
    }
}

/// Encode a key event.
pub fn encode(event: &KeyInput) -> EncodedKeybinding {
    let Modifiers {
        alt,
        ctrl,
        shift,
        meta,
    } = event.modifiers;

    let mut encoded = String::with_capacity(FLAG_COUNT + event.code.len());
    for set in [alt, ctrl, shift, meta] {
        encoded.push(flag(set));
    }
    encoded.push_str(&event.code);
    EncodedKeybinding(encoded)
}

/// Decode an encoded keybinding.
///
/// Returns `None` for empty input, input shorter than the four flag
/// characters, or flags that are not `0`/`1`.
pub fn decode(encoded: &str) -> Option<DecodedKeybinding> {
    let flags = encoded.as_bytes().get(..FLAG_COUNT)?;
    let mut parsed = [false; FLAG_COUNT];
    for (slot, byte) in parsed.iter_mut().zip(flags) {
        *slot = match byte {
            b'1' => true,
            b'0' => false,
            _ => return None,
        };
    }

    // The flags are ASCII, so byte 4 is a char boundary.
    let code = encoded[FLAG_COUNT..].to_string();
    let [alt, ctrl, shift, meta] = parsed;
    Some(DecodedKeybinding {
        alt,
        ctrl,
        shift,
        meta,
        code,
    })
}

/// Human readable label, e.g. `"Ctrl+Shift+S"`.
///
/// Modifiers are listed in the order Ctrl, Shift, Alt, Meta. A leading `Key`
/// or `Digit` is stripped from the code. Undecodable input gives `""`.
pub fn display_label(encoded: &str) -> String {
    let Some(decoded) = decode(encoded) else {
        return String::new();
    };

    let code = decoded
        .code
        .strip_prefix("Key")
        .or_else(|| decoded.code.strip_prefix("Digit"))
        .unwrap_or(&decoded.code);

    let mut parts: Vec<&str> = Vec::with_capacity(5);
    if decoded.ctrl {
        parts.push("Ctrl");
    }
    if decoded.shift {
        parts.push("Shift");
    }
    if decoded.alt {
        parts.push("Alt");
    }
    if decoded.meta {
        parts.push("Meta");
    }
    if !code.is_empty() {
        parts.push(code);
    }

    parts.join("+")
}
