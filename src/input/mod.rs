//! Input Layer
//!
//! Mouse and keyboard replay on top of a pluggable [`InputBackend`].

pub mod backend;
pub mod keyboard;
pub mod mouse;

pub use backend::{InputBackend, InputCommand, MouseButton, RecordingBackend};
pub use keyboard::{Key, Keyboard, KeysToPress, SpecialKey, DEFAULT_TYPING_SPEED};
pub use mouse::{Motion, Mouse, Target, DEFAULT_MOUSE_SPEED};
