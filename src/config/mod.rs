//! Locator Configuration
//!
//! OCR, matching, polling and input settings stored in TOML format.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{LocateError, Result};
use crate::input::{Keyboard, Mouse, DEFAULT_MOUSE_SPEED, DEFAULT_TYPING_SPEED};
use crate::locator::{Locator, DEFAULT_IMAGE_CONFIDENCE, DEFAULT_TEXT_CONFIDENCE};
use crate::vision::{MatcherOptions, OcrEngine, TesseractEngine};
use crate::wait::WaitOptions;

/// Name of the configuration file inside [`config_dir`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Locator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// OCR settings
    pub ocr: OcrSettings,
    /// Image matching settings
    pub matching: MatchingSettings,
    /// Wait/poll settings
    pub wait: WaitSettings,
    /// Mouse and keyboard settings
    pub input: InputSettings,
}

/// OCR-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code (e.g. "eng"), engine default when unset
    pub language: Option<String>,
    /// Separator between lines of a paragraph
    pub line_break: String,
    /// Separator between paragraphs
    pub paragraph_break: String,
    /// Tesseract executable
    pub tesseract_command: String,
    /// Extra tesseract arguments (e.g. ["--psm", "6"])
    pub tesseract_args: Vec<String>,
    /// Minimum word confidence for text matches (0.0 - 1.0)
    pub text_confidence: f64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        let layout = MatcherOptions::default();
        Self {
            language: layout.language,
            line_break: layout.line_break,
            paragraph_break: layout.paragraph_break,
            tesseract_command: "tesseract".to_string(),
            tesseract_args: Vec::new(),
            text_confidence: DEFAULT_TEXT_CONFIDENCE,
        }
    }
}

impl OcrSettings {
    pub fn matcher_options(&self) -> MatcherOptions {
        MatcherOptions {
            language: self.language.clone(),
            line_break: self.line_break.clone(),
            paragraph_break: self.paragraph_break.clone(),
        }
    }

    pub fn tesseract_engine(&self) -> TesseractEngine {
        TesseractEngine::with_command(&self.tesseract_command).with_args(self.tesseract_args.iter().cloned())
    }
}

/// Image matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    /// Minimum similarity for image matches (0.0 - 1.0)
    pub image_confidence: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            image_confidence: DEFAULT_IMAGE_CONFIDENCE,
        }
    }
}

/// Wait/poll settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    /// How long to keep scanning, in seconds
    pub timeout_secs: f64,
    /// Scan rate
    pub scans_per_second: f64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        let defaults = WaitOptions::default();
        Self {
            timeout_secs: defaults.timeout.as_secs_f64(),
            scans_per_second: defaults.scans_per_second,
        }
    }
}

impl WaitSettings {
    pub fn wait_options(&self) -> Result<WaitOptions> {
        let timeout = Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|e| LocateError::Config(format!("wait.timeout_secs = {}: {}", self.timeout_secs, e)))?;
        Ok(WaitOptions::new(timeout, self.scans_per_second))
    }
}

/// Mouse and keyboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Pointer speed in pixels per second
    pub mouse_speed: f64,
    /// Characters per second
    pub typing_speed: f64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            mouse_speed: DEFAULT_MOUSE_SPEED,
            typing_speed: DEFAULT_TYPING_SPEED,
        }
    }
}

impl InputSettings {
    pub fn mouse(&self) -> Mouse {
        Mouse::new(self.mouse_speed)
    }

    pub fn keyboard(&self) -> Keyboard {
        Keyboard::new(self.typing_speed)
    }
}

impl LocatorConfig {
    /// Search context over the given engine
    pub fn locator(&self, engine: Arc<dyn OcrEngine>) -> Locator {
        Locator::new(engine)
            .with_matcher_options(self.ocr.matcher_options())
            .with_text_confidence(self.ocr.text_confidence)
            .with_image_confidence(self.matching.image_confidence)
    }

    /// Search context over the configured tesseract binary
    pub fn tesseract_locator(&self) -> Locator {
        self.locator(Arc::new(self.ocr.tesseract_engine()))
    }
}

/// Get the configuration directory, creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "screenlocator", "ScreenLocator")
        .ok_or_else(|| LocateError::Config("Could not determine config directory".to_string()))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<LocatorConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: LocatorConfig =
        toml::from_str(&content).map_err(|e| LocateError::Config(format!("{}: {}", path.display(), e)))?;
    debug!("Loaded configuration from {:?}", path);
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &LocatorConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).map_err(|e| LocateError::Config(e.to_string()))?;
    std::fs::write(path, content)?;
    info!("Saved configuration to {:?}", path);
    Ok(())
}

/// Load `path` if it exists, defaults otherwise
pub fn load_or_default(path: &Path) -> Result<LocatorConfig> {
    if path.exists() {
        load_config(path)
    } else {
        debug!("No configuration at {:?}, using defaults", path);
        Ok(LocatorConfig::default())
    }
}

/// Load the per-user configuration file, defaults when it does not exist yet
pub fn load_user_config() -> Result<LocatorConfig> {
    load_or_default(&config_dir()?.join(CONFIG_FILE_NAME))
}
