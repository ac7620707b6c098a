//! Error types
//!
//! Centralized error type for the locator. "Nothing found" is never an error;
//! searches return `Option` instead.

use std::io;
use thiserror::Error;

use crate::geometry::Region;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, LocateError>;

/// Main locator error type
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Unrecognized overlap mode {0:?}, expected \"any\" or \"all\"")]
    InvalidOverlap(String),

    #[error("Unrecognized mouse button {0:?}")]
    InvalidMouseButton(String),

    #[error("Region {region:?} is outside of the {width}x{height} image")]
    OutOfBounds {
        region: Region,
        width: i32,
        height: i32,
    },

    #[error("Search window {start}..{end} does not fall on character boundaries")]
    InvalidSearchWindow { start: usize, end: usize },

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("OCR engine failed: {0:#}")]
    OcrEngine(anyhow::Error),

    #[error("Needle {needle_width}x{needle_height} is larger than haystack {haystack_width}x{haystack_height}")]
    TemplateTooLarge {
        needle_width: u32,
        needle_height: u32,
        haystack_width: u32,
        haystack_height: u32,
    },

    #[error("Needle not found: {0}")]
    NeedleNotFound(String),

    #[error("Typing speed must be a number greater than zero; received {0}")]
    InvalidTypingSpeed(f64),

    #[error("Mouse speed must be a number greater than zero; received {0}")]
    InvalidMouseSpeed(f64),

    #[error("No more than one of speed and duration may be given")]
    ConflictingMotion,

    #[error("No screen attached to search for {0}")]
    MissingScreen(String),

    #[error("Image error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
