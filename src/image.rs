//! Images and needles
//!
//! An [`Image`] is either a root pixel buffer or a child region of another
//! image. Children share their root's pixels and report regions both relative
//! to their parent and relative to the root. Each image owns an OCR matcher
//! cache, so repeated text searches on the same image run OCR once.
//!
//! Search results are child images of the searched image.

use image::{imageops, RgbaImage};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{LocateError, Result};
use crate::geometry::{Point, Region, SubRegion};
use crate::locator::Locator;
use crate::vision::cache::OcrMatcherCache;
use crate::vision::matcher::{MatcherOptions, OcrMatcher, RegexFlags, SearchOptions};
use crate::vision::ocr::OcrEngine;
use crate::vision::template;

/// Label consulted by [`Found::click_point`]
pub const CLICK_LABEL: &str = "click";

enum Backing {
    Root(RgbaImage),
    Child { parent: Image, region: Region },
}

struct ImageInner {
    backing: Backing,
    labels: RwLock<HashMap<String, Point>>,
    ocr_cache: OcrMatcherCache,
}

/// A root image or a region of one; cheap to clone
#[derive(Clone)]
pub struct Image {
    inner: Arc<ImageInner>,
}

impl Image {
    /// Wrap a pixel buffer as a root image
    pub fn new(pixels: RgbaImage) -> Self {
        Self::from_backing(Backing::Root(pixels))
    }

    /// Load a root image from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pixels = image::open(path)?.to_rgba8();
        info!("Loaded image {:?} ({}x{})", path, pixels.width(), pixels.height());
        Ok(Self::new(pixels))
    }

    fn from_backing(backing: Backing) -> Self {
        Self {
            inner: Arc::new(ImageInner {
                backing,
                labels: RwLock::new(HashMap::new()),
                ocr_cache: OcrMatcherCache::new(),
            }),
        }
    }

    pub fn width(&self) -> u32 {
        match &self.inner.backing {
            Backing::Root(pixels) => pixels.width(),
            Backing::Child { region, .. } => region.width as u32,
        }
    }

    pub fn height(&self) -> u32 {
        match &self.inner.backing {
            Backing::Root(pixels) => pixels.height(),
            Backing::Child { region, .. } => region.height as u32,
        }
    }

    /// Region relative to the parent (the full bounds for a root image)
    pub fn region(&self) -> Region {
        match &self.inner.backing {
            Backing::Root(pixels) => Region::new(0, 0, pixels.width() as i32, pixels.height() as i32),
            Backing::Child { region, .. } => *region,
        }
    }

    /// Region relative to the root image
    pub fn absolute_region(&self) -> Region {
        match &self.inner.backing {
            Backing::Root(_) => self.region(),
            Backing::Child { parent, region } => region.translate(parent.absolute_region().min_point()),
        }
    }

    /// This image's own bounds, at the origin
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width() as i32, self.height() as i32)
    }

    pub fn parent(&self) -> Option<&Image> {
        match &self.inner.backing {
            Backing::Root(_) => None,
            Backing::Child { parent, .. } => Some(parent),
        }
    }

    pub fn root(&self) -> &Image {
        match &self.inner.backing {
            Backing::Root(_) => self,
            Backing::Child { parent, .. } => parent.root(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.inner.backing, Backing::Root(_))
    }

    /// Whether both handles refer to the same image
    pub fn same_image(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Child image covering `region` (relative to this image)
    pub fn child(&self, region: Region) -> Result<Image> {
        let width = self.width() as i32;
        let height = self.height() as i32;

        if region.left() < 0
            || region.top() < 0
            || region.width < 0
            || region.height < 0
            || region.right() > width
            || region.bottom() > height
        {
            return Err(LocateError::OutOfBounds { region, width, height });
        }

        Ok(Self::from_backing(Backing::Child {
            parent: self.clone(),
            region,
        }))
    }

    /// Child image from a fractional or absolute sub-region request
    pub fn sub_image(&self, request: SubRegion) -> Result<Image> {
        self.child(self.bounds().sub_region(request))
    }

    /// Pixels of this image (a copy of the covered area of the root)
    pub fn to_rgba(&self) -> RgbaImage {
        if let Backing::Root(pixels) = &self.inner.backing {
            return pixels.clone();
        }

        let area = self.absolute_region();
        imageops::crop_imm(
            self.root_pixels(),
            area.x as u32,
            area.y as u32,
            area.width as u32,
            area.height as u32,
        )
        .to_image()
    }

    fn root_pixels(&self) -> &RgbaImage {
        match &self.inner.backing {
            Backing::Root(pixels) => pixels,
            Backing::Child { parent, .. } => parent.root_pixels(),
        }
    }

    /// Region and the frame it lives in
    fn strip_frame(&self, absolute: bool) -> (Region, i32, i32) {
        if absolute {
            let root = self.root();
            (self.absolute_region(), root.width() as i32, root.height() as i32)
        } else {
            let frame = self.parent().unwrap_or(self);
            (self.region(), frame.width() as i32, frame.height() as i32)
        }
    }

    /// Strip left of this image, `size` pixels wide or up to the frame edge
    pub fn region_left(&self, size: Option<i32>, absolute: bool) -> Region {
        let (region, _, _) = self.strip_frame(absolute);
        let left = size.map_or(0, |size| (region.left() - size).max(0));
        Region::new(left, region.top(), region.left() - left, region.height)
    }

    /// Strip above this image
    pub fn region_above(&self, size: Option<i32>, absolute: bool) -> Region {
        let (region, _, _) = self.strip_frame(absolute);
        let top = size.map_or(0, |size| (region.top() - size).max(0));
        Region::new(region.left(), top, region.width, region.top() - top)
    }

    /// Strip right of this image, starting one pixel past its right edge
    pub fn region_right(&self, size: Option<i32>, absolute: bool) -> Region {
        let (region, frame_width, _) = self.strip_frame(absolute);
        let left = region.right() + 1;
        let remaining = (frame_width - left).max(0);
        let width = size.map_or(remaining, |size| size.min(remaining));
        Region::new(left, region.top(), width, region.height)
    }

    /// Strip below this image, starting one pixel past its bottom edge
    pub fn region_below(&self, size: Option<i32>, absolute: bool) -> Region {
        let (region, _, frame_height) = self.strip_frame(absolute);
        let top = region.bottom() + 1;
        let remaining = (frame_height - top).max(0);
        let height = size.map_or(remaining, |size| size.min(remaining));
        Region::new(region.left(), top, region.width, height)
    }

    /// Name a point inside this image (relative to its top-left corner)
    pub fn set_label(&self, name: impl Into<String>, point: Point) {
        self.inner.labels.write().insert(name.into(), point);
    }

    pub fn with_label(self, name: impl Into<String>, point: Point) -> Self {
        self.set_label(name, point);
        self
    }

    pub fn label(&self, name: &str) -> Option<Point> {
        self.inner.labels.read().get(name).copied()
    }

    pub fn labels(&self) -> HashMap<String, Point> {
        self.inner.labels.read().clone()
    }

    /// Matchers built for this image
    pub fn ocr_cache(&self) -> &OcrMatcherCache {
        &self.inner.ocr_cache
    }

    /// OCR matcher for this image, running the engine on first use
    pub fn ocr(&self, engine: &dyn OcrEngine, options: &MatcherOptions) -> Result<Arc<OcrMatcher>> {
        if let Some(matcher) = self.inner.ocr_cache.get(options) {
            return Ok(matcher);
        }
        self.inner.ocr_cache.get_or_build(engine, &self.to_rgba(), options)
    }

    /// Every occurrence of `needle` in the OCR transcript with confidence >= `confidence`
    pub fn find_text_all(
        &self,
        engine: &dyn OcrEngine,
        options: &MatcherOptions,
        needle: &TextNeedle,
        confidence: f64,
    ) -> Result<Vec<Found>> {
        let matcher = self.ocr(engine, options)?;

        let mut found = Vec::new();
        for segment in matcher.find_all(&needle.pattern, &needle.search_options())? {
            let score = segment.confidence.unwrap_or(0.0);
            if score < confidence {
                continue;
            }
            found.push(Found {
                needle: Needle::Text(needle.clone()),
                image: self.child(segment.region.normalized())?,
                confidence: score,
            });
        }

        debug!("Text {:?}: {} match(es) >= {}", needle.pattern, found.len(), confidence);
        Ok(found)
    }

    /// Every placement of `needle` scoring >= `confidence`
    pub fn find_image_all(&self, needle: &Image, confidence: f64) -> Result<Vec<Found>> {
        let hits = template::find_all_within(&needle.to_rgba(), &self.to_rgba(), confidence)?;

        hits.into_iter()
            .map(|hit| -> Result<Found> {
                Ok(Found {
                    needle: Needle::Image(needle.clone()),
                    image: self.child(hit.region)?,
                    confidence: hit.score,
                })
            })
            .collect()
    }

    /// Every match of every needle, needle by needle.
    ///
    /// `confidence` overrides the locator's per-kind default.
    pub fn find_all(&self, locator: &Locator, needles: &[Needle], confidence: Option<f64>) -> Result<Vec<Found>> {
        let mut found = Vec::new();
        for needle in needles {
            let matches = match needle {
                Needle::Text(text) => self.find_text_all(
                    locator.engine(),
                    locator.matcher_options(),
                    text,
                    confidence.unwrap_or(locator.text_confidence()),
                )?,
                Needle::Image(image) => {
                    self.find_image_all(image, confidence.unwrap_or(locator.image_confidence()))?
                }
            };
            found.extend(matches);
        }
        Ok(found)
    }

    /// Highest-confidence match of any needle; earlier matches win ties
    pub fn find(&self, locator: &Locator, needles: &[Needle], confidence: Option<f64>) -> Result<Option<Found>> {
        Ok(best_match(self.find_all(locator, needles, confidence)?))
    }

    pub fn contains(&self, locator: &Locator, needles: &[Needle], confidence: Option<f64>) -> Result<bool> {
        Ok(self.find(locator, needles, confidence)?.is_some())
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.backing {
            Backing::Root(pixels) => f
                .debug_struct("Image")
                .field("width", &pixels.width())
                .field("height", &pixels.height())
                .finish(),
            Backing::Child { parent, region } => f
                .debug_struct("ChildImage")
                .field("parent", parent)
                .field("region", region)
                .finish(),
        }
    }
}

/// Highest confidence wins; the first one on ties
pub fn best_match(found: Vec<Found>) -> Option<Found> {
    found.into_iter().fold(None, |best: Option<Found>, candidate| match best {
        Some(current) if current.confidence >= candidate.confidence => Some(current),
        _ => Some(candidate),
    })
}

/// Text to look for in an image's OCR transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNeedle {
    pub pattern: String,
    pub regex: bool,
    pub flags: RegexFlags,
}

impl TextNeedle {
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            pattern: text.into(),
            regex: false,
            flags: RegexFlags::default(),
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            regex: true,
            flags: RegexFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: RegexFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            regex: self.regex,
            flags: self.flags,
            ..SearchOptions::default()
        }
    }
}

/// Something to search for: text or a sub-image
#[derive(Debug, Clone)]
pub enum Needle {
    Text(TextNeedle),
    Image(Image),
}

impl From<&str> for Needle {
    fn from(text: &str) -> Self {
        Needle::Text(TextNeedle::literal(text))
    }
}

impl From<String> for Needle {
    fn from(text: String) -> Self {
        Needle::Text(TextNeedle::literal(text))
    }
}

impl From<TextNeedle> for Needle {
    fn from(needle: TextNeedle) -> Self {
        Needle::Text(needle)
    }
}

impl From<Image> for Needle {
    fn from(image: Image) -> Self {
        Needle::Image(image)
    }
}

impl fmt::Display for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Needle::Text(text) if text.regex => write!(f, "text /{}/", text.pattern),
            Needle::Text(text) => write!(f, "text {:?}", text.pattern),
            Needle::Image(image) => write!(f, "image {}x{}", image.width(), image.height()),
        }
    }
}

/// A needle located in a haystack image
#[derive(Debug, Clone)]
pub struct Found {
    pub needle: Needle,
    /// Child of the searched image covering the match
    pub image: Image,
    pub confidence: f64,
}

impl Found {
    /// Region relative to the searched image
    pub fn region(&self) -> Region {
        self.image.region()
    }

    /// Region relative to the root image (screen coordinates for screenshots)
    pub fn absolute_region(&self) -> Region {
        self.image.absolute_region()
    }

    /// Absolute point for a label of the needle image, or the center
    pub fn target(&self, label: Option<&str>) -> Point {
        let region = self.absolute_region();
        let labelled = match (&self.needle, label) {
            (Needle::Image(needle), Some(label)) => needle.label(label),
            _ => None,
        };
        labelled.map_or_else(
            || region.center(),
            |point| point.offset(region.left(), region.top()),
        )
    }

    /// Where to click: the needle's `click` label if it has one, else the center
    pub fn click_point(&self) -> Point {
        self.target(Some(CLICK_LABEL))
    }
}
