//! screen-locator - Screen automation primitives
//!
//! Finds OCR'd text and sub-images on screenshots, maps matches back to
//! screen regions, and replays mouse and keyboard input relative to them.

pub mod config;
pub mod error;
pub mod geometry;
pub mod image;
pub mod input;
pub mod locator;
pub mod vision;
pub mod wait;

pub use crate::config::LocatorConfig;
pub use crate::error::{LocateError, Result};
pub use crate::geometry::{Extent, Overlap, Point, Region, SubRegion};
pub use crate::image::{best_match, Found, Image, Needle, TextNeedle, CLICK_LABEL};
pub use crate::input::{InputBackend, Key, Keyboard, KeysToPress, Motion, Mouse, MouseButton, SpecialKey, Target};
pub use crate::locator::Locator;
pub use crate::vision::{
    MatcherOptions, OcrEngine, OcrMatcher, OcrRow, RegexFlags, SearchOptions, TesseractEngine, TextMatch,
};
pub use crate::wait::{wait_until_appears, wait_until_vanishes, ImageSource, WaitOptions};
