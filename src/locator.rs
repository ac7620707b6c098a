//! Search context
//!
//! Bundles the OCR engine, the transcript layout and the default confidence
//! thresholds used when searching images for needles.

use std::fmt;
use std::sync::Arc;

use crate::vision::matcher::MatcherOptions;
use crate::vision::ocr::OcrEngine;

/// Default minimum OCR confidence for text matches (0.0 - 1.0)
pub const DEFAULT_TEXT_CONFIDENCE: f64 = 0.5;
/// Default minimum similarity for image matches (0.0 - 1.0)
pub const DEFAULT_IMAGE_CONFIDENCE: f64 = 0.99;

/// Everything needed to resolve needles against an image
#[derive(Clone)]
pub struct Locator {
    engine: Arc<dyn OcrEngine>,
    matcher_options: MatcherOptions,
    text_confidence: f64,
    image_confidence: f64,
}

impl Locator {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine,
            matcher_options: MatcherOptions::default(),
            text_confidence: DEFAULT_TEXT_CONFIDENCE,
            image_confidence: DEFAULT_IMAGE_CONFIDENCE,
        }
    }

    pub fn with_matcher_options(mut self, options: MatcherOptions) -> Self {
        self.matcher_options = options;
        self
    }

    pub fn with_text_confidence(mut self, confidence: f64) -> Self {
        self.text_confidence = confidence;
        self
    }

    pub fn with_image_confidence(mut self, confidence: f64) -> Self {
        self.image_confidence = confidence;
        self
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    pub fn matcher_options(&self) -> &MatcherOptions {
        &self.matcher_options
    }

    pub fn text_confidence(&self) -> f64 {
        self.text_confidence
    }

    pub fn image_confidence(&self) -> f64 {
        self.image_confidence
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("matcher_options", &self.matcher_options)
            .field("text_confidence", &self.text_confidence)
            .field("image_confidence", &self.image_confidence)
            .finish_non_exhaustive()
    }
}
