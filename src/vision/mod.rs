//! Vision Layer
//!
//! Text and image search over captured screen images:
//! - OCR engine boundary and the tesseract backend
//! - OCR transcript matcher mapping text offsets back to screen regions
//! - Per-image matcher cache
//! - Template matching for sub-images

pub mod cache;
pub mod matcher;
pub mod ocr;
pub mod template;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::{MatcherKey, OcrMatcherCache};
pub use matcher::{MatcherOptions, OcrMatcher, OcrSegment, RegexFlags, SearchOptions, TextMatch};
pub use ocr::{parse_tsv, ConfidenceScale, OcrEngine, OcrRow, TesseractEngine};
pub use template::{find_all_within, find_within, TemplateHit};
