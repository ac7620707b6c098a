//! OCR matcher cache
//!
//! One OCR run per image and per transcript layout. Owned by the image it
//! caches for; callers invalidate it explicitly.

use image::RgbaImage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::matcher::{MatcherOptions, OcrMatcher};
use super::ocr::OcrEngine;
use crate::error::Result;

/// Cache key: language plus the two separators
pub type MatcherKey = MatcherOptions;

/// Lazily populated matchers for a single image
#[derive(Debug, Default)]
pub struct OcrMatcherCache {
    matchers: RwLock<HashMap<MatcherKey, Arc<OcrMatcher>>>,
}

impl OcrMatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached matcher for `options`, running the engine on a miss
    pub fn get_or_build(
        &self,
        engine: &dyn OcrEngine,
        image: &RgbaImage,
        options: &MatcherOptions,
    ) -> Result<Arc<OcrMatcher>> {
        if let Some(matcher) = self.matchers.read().get(options) {
            debug!("OCR cache hit for {:?}", options);
            return Ok(Arc::clone(matcher));
        }

        debug!("OCR cache miss for {:?}", options);
        let matcher = Arc::new(OcrMatcher::new(engine, image, options.clone())?);

        // Another thread may have won the race; keep whichever landed first
        let mut matchers = self.matchers.write();
        let entry = matchers.entry(options.clone()).or_insert(matcher);
        Ok(Arc::clone(entry))
    }

    /// Cached matcher without running OCR
    pub fn get(&self, options: &MatcherOptions) -> Option<Arc<OcrMatcher>> {
        self.matchers.read().get(options).cloned()
    }

    /// Store an externally built matcher
    pub fn insert(&self, matcher: OcrMatcher) -> Arc<OcrMatcher> {
        let matcher = Arc::new(matcher);
        self.matchers
            .write()
            .insert(matcher.options().clone(), Arc::clone(&matcher));
        matcher
    }

    /// Drop one layout's matcher
    pub fn remove(&self, options: &MatcherOptions) -> Option<Arc<OcrMatcher>> {
        self.matchers.write().remove(options)
    }

    /// Drop everything
    pub fn clear(&self) {
        self.matchers.write().clear();
    }

    pub fn len(&self) -> usize {
        self.matchers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.read().is_empty()
    }
}
