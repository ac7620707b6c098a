//! Mouse replay
//!
//! Moves to fixed points or to needles found on an attached screen, at a
//! constant speed or over a fixed duration.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::backend::{InputBackend, MouseButton};
use crate::error::{LocateError, Result};
use crate::geometry::Point;
use crate::image::Needle;
use crate::locator::Locator;
use crate::wait::ImageSource;

/// Pixels per second
pub const DEFAULT_MOUSE_SPEED: f64 = 244.0;

/// How a pointer move is paced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Motion {
    /// The mouse's default speed
    #[default]
    Default,
    /// Pixels per second
    Speed(f64),
    /// Fixed travel time
    Duration(Duration),
}

impl Motion {
    /// At most one of `speed` and `duration` may be set
    pub fn new(speed: Option<f64>, duration: Option<Duration>) -> Result<Self> {
        match (speed, duration) {
            (Some(_), Some(_)) => Err(LocateError::ConflictingMotion),
            (Some(speed), None) => Ok(Motion::Speed(speed)),
            (None, Some(duration)) => Ok(Motion::Duration(duration)),
            (None, None) => Ok(Motion::Default),
        }
    }
}

/// Where to move the pointer
#[derive(Debug, Clone)]
pub enum Target {
    Point(Point),
    /// Click point of the best match among these needles on the screen
    Needles(Vec<Needle>),
}

impl From<Point> for Target {
    fn from(point: Point) -> Self {
        Target::Point(point)
    }
}

impl From<(i32, i32)> for Target {
    fn from(point: (i32, i32)) -> Self {
        Target::Point(point.into())
    }
}

impl From<Needle> for Target {
    fn from(needle: Needle) -> Self {
        Target::Needles(vec![needle])
    }
}

impl From<Vec<Needle>> for Target {
    fn from(needles: Vec<Needle>) -> Self {
        Target::Needles(needles)
    }
}

impl From<&str> for Target {
    fn from(text: &str) -> Self {
        Target::Needles(vec![text.into()])
    }
}

/// Screen the mouse searches needles on
#[derive(Clone)]
struct Screen {
    source: Arc<dyn ImageSource>,
    locator: Locator,
}

/// Pointer control through a backend
#[derive(Clone)]
pub struct Mouse {
    /// Pixels per second
    pub default_speed: f64,
    screen: Option<Screen>,
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new(DEFAULT_MOUSE_SPEED)
    }
}

impl std::fmt::Debug for Mouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mouse")
            .field("default_speed", &self.default_speed)
            .field("has_screen", &self.screen.is_some())
            .finish()
    }
}

impl Mouse {
    pub fn new(default_speed: f64) -> Self {
        Self {
            default_speed,
            screen: None,
        }
    }

    /// Resolve needle targets against images from `source`
    pub fn with_screen(mut self, source: Arc<dyn ImageSource>, locator: Locator) -> Self {
        self.screen = Some(Screen { source, locator });
        self
    }

    /// Absolute point a target refers to
    pub fn resolve(&self, target: &Target) -> Result<Point> {
        let needles = match target {
            Target::Point(point) => return Ok(*point),
            Target::Needles(needles) => needles,
        };
        let description = describe(needles);

        let screen = self
            .screen
            .as_ref()
            .ok_or_else(|| LocateError::MissingScreen(description.clone()))?;
        let found = screen
            .source
            .capture()?
            .find(&screen.locator, needles, None)?
            .ok_or(LocateError::NeedleNotFound(description))?;

        Ok(found.click_point())
    }

    /// Move to `target`, paced by `motion`
    pub fn move_to(&self, backend: &mut dyn InputBackend, target: impl Into<Target>, motion: Motion) -> Result<()> {
        let point = self.resolve(&target.into())?;

        let duration = match motion {
            Motion::Duration(duration) => duration,
            Motion::Speed(speed) => travel_time(backend.position()?, point, speed)?,
            Motion::Default => travel_time(backend.position()?, point, self.default_speed)?,
        };

        debug!("Moving pointer to {} over {:?}", point, duration);
        backend.move_to(point, duration)
    }

    pub fn click(&self, backend: &mut dyn InputBackend, button: MouseButton, count: u32) -> Result<()> {
        backend.click(button, count)
    }

    pub fn button_press(&self, backend: &mut dyn InputBackend, button: MouseButton) -> Result<()> {
        backend.button_down(button)
    }

    pub fn button_release(&self, backend: &mut dyn InputBackend, button: MouseButton) -> Result<()> {
        backend.button_up(button)
    }

    /// Hold `button` while `action` runs; the button is released even when it fails
    pub fn button_hold<T, F>(&self, backend: &mut dyn InputBackend, button: MouseButton, action: F) -> Result<T>
    where
        F: FnOnce(&mut dyn InputBackend) -> Result<T>,
    {
        backend.button_down(button)?;
        let result = action(&mut *backend);
        backend.button_up(button)?;
        result
    }

    pub fn scroll_vertical(&self, backend: &mut dyn InputBackend, amount: i32) -> Result<()> {
        backend.scroll_vertical(amount)
    }

    pub fn scroll_horizontal(&self, backend: &mut dyn InputBackend, amount: i32) -> Result<()> {
        backend.scroll_horizontal(amount)
    }
}

fn travel_time(from: Point, to: Point, speed: f64) -> Result<Duration> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(LocateError::InvalidMouseSpeed(speed));
    }
    Duration::try_from_secs_f64(from.distance_to(to) / speed).map_err(|_| LocateError::InvalidMouseSpeed(speed))
}

fn describe(needles: &[Needle]) -> String {
    needles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
