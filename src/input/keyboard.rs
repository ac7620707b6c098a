//! Keyboard replay
//!
//! Keys are either literal text or named special keys. A [`KeysToPress`]
//! sequence is typed item by item, or pressed all at once for combinations.

use std::fmt;
use std::ops::{Add, AddAssign};
use std::time::Duration;
use tracing::debug;

use super::backend::InputBackend;
use crate::error::{LocateError, Result};

/// Characters per second
pub const DEFAULT_TYPING_SPEED: f64 = 300.0 / 60.0;

/// Named keys that cannot be typed as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Alt,
    CapsLock,
    Ctrl,
    Shift,
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

impl SpecialKey {
    /// Backend key name
    pub fn name(&self) -> &'static str {
        match self {
            SpecialKey::Alt => "alt",
            SpecialKey::CapsLock => "capslock",
            SpecialKey::Ctrl => "ctrl",
            SpecialKey::Shift => "shift",
            SpecialKey::Escape => "escape",
            SpecialKey::Enter => "enter",
            SpecialKey::Tab => "tab",
            SpecialKey::Backspace => "backspace",
            SpecialKey::Delete => "delete",
            SpecialKey::Up => "up",
            SpecialKey::Down => "down",
            SpecialKey::Left => "left",
            SpecialKey::Right => "right",
        }
    }
}

impl fmt::Display for SpecialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One item of a key sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Text(String),
    Special(SpecialKey),
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Text(text.to_string())
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Key::Text(text)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Text(c.to_string())
    }
}

impl From<SpecialKey> for Key {
    fn from(key: SpecialKey) -> Self {
        Key::Special(key)
    }
}

/// Ordered key sequence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeysToPress(Vec<Key>);

impl KeysToPress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<Key>) {
        self.0.push(key.into());
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distinct backend key names in first-seen order; text is split into characters
    pub fn unique_keys(&self) -> Vec<String> {
        let mut unique: Vec<String> = Vec::new();
        let mut add = |name: String| {
            if !unique.contains(&name) {
                unique.push(name);
            }
        };

        for key in &self.0 {
            match key {
                Key::Text(text) => text.chars().for_each(|c| add(c.to_string())),
                Key::Special(special) => add(special.name().to_string()),
            }
        }
        unique
    }
}

impl From<Key> for KeysToPress {
    fn from(key: Key) -> Self {
        KeysToPress(vec![key])
    }
}

impl From<Vec<Key>> for KeysToPress {
    fn from(keys: Vec<Key>) -> Self {
        KeysToPress(keys)
    }
}

impl<K: Into<Key>> FromIterator<K> for KeysToPress {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        KeysToPress(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for KeysToPress {
    type Item = Key;
    type IntoIter = std::vec::IntoIter<Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl AddAssign<KeysToPress> for KeysToPress {
    fn add_assign(&mut self, other: KeysToPress) {
        self.0.extend(other.0);
    }
}

impl Add<KeysToPress> for KeysToPress {
    type Output = KeysToPress;

    fn add(mut self, other: KeysToPress) -> KeysToPress {
        self += other;
        self
    }
}

impl Add<KeysToPress> for SpecialKey {
    type Output = KeysToPress;

    fn add(self, keys: KeysToPress) -> KeysToPress {
        KeysToPress::from(self) + keys
    }
}

impl Add<KeysToPress> for &str {
    type Output = KeysToPress;

    fn add(self, keys: KeysToPress) -> KeysToPress {
        KeysToPress::from(self) + keys
    }
}

/// Sequence conversions and `+` for every single-key type
macro_rules! key_sequence_ops {
    ($($key:ty),*) => {$(
        impl From<$key> for KeysToPress {
            fn from(key: $key) -> Self {
                KeysToPress(vec![key.into()])
            }
        }

        impl AddAssign<$key> for KeysToPress {
            fn add_assign(&mut self, key: $key) {
                self.push(key);
            }
        }

        impl Add<$key> for KeysToPress {
            type Output = KeysToPress;

            fn add(mut self, key: $key) -> KeysToPress {
                self += key;
                self
            }
        }

        impl Add<$key> for SpecialKey {
            type Output = KeysToPress;

            fn add(self, key: $key) -> KeysToPress {
                KeysToPress::from(self) + key
            }
        }
    )*};
}

key_sequence_ops!(&str, String, char, SpecialKey);

impl Add<SpecialKey> for &str {
    type Output = KeysToPress;

    fn add(self, key: SpecialKey) -> KeysToPress {
        KeysToPress::from(self) + key
    }
}

/// Types text and presses key combinations through a backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyboard {
    /// Characters per second
    pub default_typing_speed: f64,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            default_typing_speed: DEFAULT_TYPING_SPEED,
        }
    }
}

impl Keyboard {
    pub fn new(default_typing_speed: f64) -> Self {
        Self { default_typing_speed }
    }

    /// Type `keys` at `speed` characters per second (the default when `None`).
    ///
    /// Pauses `1 / speed` between characters of a string and between items,
    /// never after the last item.
    pub fn write(
        &self,
        backend: &mut dyn InputBackend,
        keys: impl Into<KeysToPress>,
        speed: Option<f64>,
    ) -> Result<()> {
        let speed = speed.unwrap_or(self.default_typing_speed);
        if !speed.is_finite() || speed <= 0.0 {
            return Err(LocateError::InvalidTypingSpeed(speed));
        }
        let interval =
            Duration::try_from_secs_f64(1.0 / speed).map_err(|_| LocateError::InvalidTypingSpeed(speed))?;

        let keys = keys.into();
        debug!("Typing {} item(s) at {} chars/s", keys.len(), speed);

        let count = keys.len();
        for (index, key) in keys.into_iter().enumerate() {
            match key {
                Key::Text(text) => backend.write(&text, interval)?,
                Key::Special(special) => backend.press(special.name())?,
            }
            if index + 1 != count {
                backend.sleep(interval)?;
            }
        }
        Ok(())
    }

    /// Hold down every distinct key
    pub fn key_press(&self, backend: &mut dyn InputBackend, keys: impl Into<KeysToPress>) -> Result<()> {
        for key in keys.into().unique_keys() {
            backend.key_down(&key)?;
        }
        Ok(())
    }

    /// Release every distinct key, in reverse press order
    pub fn key_release(&self, backend: &mut dyn InputBackend, keys: impl Into<KeysToPress>) -> Result<()> {
        for key in keys.into().unique_keys().iter().rev() {
            backend.key_up(key)?;
        }
        Ok(())
    }

    /// Hold `keys` while `action` runs; keys are released even when it fails
    pub fn key_hold<T, F>(&self, backend: &mut dyn InputBackend, keys: impl Into<KeysToPress>, action: F) -> Result<T>
    where
        F: FnOnce(&mut dyn InputBackend) -> Result<T>,
    {
        let keys = keys.into();
        self.key_press(backend, keys.clone())?;
        let result = action(&mut *backend);
        self.key_release(backend, keys)?;
        result
    }
}
