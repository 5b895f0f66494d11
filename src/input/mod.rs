//! Key events, their canonical encoding and the input handling contract.

pub mod encoding;
pub mod handler;
pub mod key;
#[cfg(feature = "runtime")]
pub mod terminal;

pub use encoding::{decode, display_label, encode, DecodedKeybinding, EncodedKeybinding};
pub use handler::{InputContext, InputHandler, InputResult, MenuEvent, PointerTarget};
pub use key::{KeyInput, Modifiers};
