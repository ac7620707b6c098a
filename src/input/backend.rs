//! Input backends
//!
//! The [`InputBackend`] trait is the seam to whatever injects OS events.
//! [`RecordingBackend`] performs nothing and records every command, for dry
//! runs and tests.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::{LocateError, Result};
use crate::geometry::Point;

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Center,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Center => "center",
        }
    }
}

impl FromStr for MouseButton {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "center" => Ok(MouseButton::Center),
            _ => Err(LocateError::InvalidMouseButton(s.to_string())),
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low-level input operations
pub trait InputBackend {
    /// Current pointer location
    fn position(&self) -> Result<Point>;

    /// Move the pointer, taking `duration` to get there
    fn move_to(&mut self, point: Point, duration: Duration) -> Result<()>;

    fn click(&mut self, button: MouseButton, count: u32) -> Result<()>;

    fn button_down(&mut self, button: MouseButton) -> Result<()>;

    fn button_up(&mut self, button: MouseButton) -> Result<()>;

    fn key_down(&mut self, key: &str) -> Result<()>;

    fn key_up(&mut self, key: &str) -> Result<()>;

    /// Press and release a named key
    fn press(&mut self, key: &str) -> Result<()>;

    /// Type `text` with `interval` between characters
    fn write(&mut self, text: &str, interval: Duration) -> Result<()>;

    fn scroll_vertical(&mut self, amount: i32) -> Result<()>;

    fn scroll_horizontal(&mut self, amount: i32) -> Result<()>;

    fn sleep(&mut self, duration: Duration) -> Result<()>;
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    MoveTo { point: Point, duration: Duration },
    Click { button: MouseButton, count: u32 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    KeyDown(String),
    KeyUp(String),
    Press(String),
    Write { text: String, interval: Duration },
    ScrollVertical(i32),
    ScrollHorizontal(i32),
    Sleep(Duration),
}

/// Backend that records commands instead of performing them
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    position: Point,
    commands: Vec<InputCommand>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the pointer at `position`
    pub fn at(position: Point) -> Self {
        Self {
            position,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[InputCommand] {
        &self.commands
    }

    /// Hand over the recorded commands, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<InputCommand> {
        std::mem::take(&mut self.commands)
    }

    fn record(&mut self, command: InputCommand) -> Result<()> {
        debug!("Input: {:?}", command);
        self.commands.push(command);
        Ok(())
    }
}

impl InputBackend for RecordingBackend {
    fn position(&self) -> Result<Point> {
        Ok(self.position)
    }

    fn move_to(&mut self, point: Point, duration: Duration) -> Result<()> {
        self.position = point;
        self.record(InputCommand::MoveTo { point, duration })
    }

    fn click(&mut self, button: MouseButton, count: u32) -> Result<()> {
        self.record(InputCommand::Click { button, count })
    }

    fn button_down(&mut self, button: MouseButton) -> Result<()> {
        self.record(InputCommand::ButtonDown(button))
    }

    fn button_up(&mut self, button: MouseButton) -> Result<()> {
        self.record(InputCommand::ButtonUp(button))
    }

    fn key_down(&mut self, key: &str) -> Result<()> {
        self.record(InputCommand::KeyDown(key.to_string()))
    }

    fn key_up(&mut self, key: &str) -> Result<()> {
        self.record(InputCommand::KeyUp(key.to_string()))
    }

    fn press(&mut self, key: &str) -> Result<()> {
        self.record(InputCommand::Press(key.to_string()))
    }

    fn write(&mut self, text: &str, interval: Duration) -> Result<()> {
        self.record(InputCommand::Write {
            text: text.to_string(),
            interval,
        })
    }

    fn scroll_vertical(&mut self, amount: i32) -> Result<()> {
        self.record(InputCommand::ScrollVertical(amount))
    }

    fn scroll_horizontal(&mut self, amount: i32) -> Result<()> {
        self.record(InputCommand::ScrollHorizontal(amount))
    }

    fn sleep(&mut self, duration: Duration) -> Result<()> {
        self.record(InputCommand::Sleep(duration))
    }
}
