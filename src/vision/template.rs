//! Template matching
//!
//! Locates a needle image inside a haystack image using imageproc's
//! normalized sum-of-squared-differences correlation. Scores are reported as
//! `1 - difference`, so a pixel-perfect match scores 1.0.

use image::{imageops, GrayImage, RgbaImage};
use imageproc::template_matching::{match_template, MatchTemplateMethod};
use std::time::Instant;
use tracing::debug;

use crate::error::{LocateError, Result};
use crate::geometry::Region;

/// A scored placement of the needle in the haystack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateHit {
    /// Placement, relative to the haystack
    pub region: Region,
    /// Similarity (1.0 = identical)
    pub score: f64,
}

/// Every placement scoring at least `threshold`, in row-major order
pub fn find_all_within(needle: &RgbaImage, haystack: &RgbaImage, threshold: f64) -> Result<Vec<TemplateHit>> {
    let (needle_width, needle_height) = needle.dimensions();
    let (haystack_width, haystack_height) = haystack.dimensions();

    if needle_width > haystack_width || needle_height > haystack_height {
        return Err(LocateError::TemplateTooLarge {
            needle_width,
            needle_height,
            haystack_width,
            haystack_height,
        });
    }
    if needle_width == 0 || needle_height == 0 {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    let needle_gray: GrayImage = imageops::grayscale(needle);
    let haystack_gray: GrayImage = imageops::grayscale(haystack);

    let differences = match_template(
        &haystack_gray,
        &needle_gray,
        MatchTemplateMethod::SumOfSquaredErrorsNormalized,
    );

    let mut hits = Vec::new();
    for (x, y, pixel) in differences.enumerate_pixels() {
        let score = 1.0 - pixel.0[0] as f64;
        // NaN (flat black needle over flat black area) never passes
        if score >= threshold {
            hits.push(TemplateHit {
                region: Region::new(x as i32, y as i32, needle_width as i32, needle_height as i32),
                score,
            });
        }
    }

    debug!(
        "Template {}x{} in {}x{}: {} hit(s) >= {} in {:?}",
        needle_width,
        needle_height,
        haystack_width,
        haystack_height,
        hits.len(),
        threshold,
        start.elapsed()
    );

    Ok(hits)
}

/// Best placement scoring at least `threshold`; the first one wins ties
pub fn find_within(needle: &RgbaImage, haystack: &RgbaImage, threshold: f64) -> Result<Option<TemplateHit>> {
    let hits = find_all_within(needle, haystack, threshold)?;
    Ok(best_hit(hits))
}

fn best_hit(hits: Vec<TemplateHit>) -> Option<TemplateHit> {
    hits.into_iter()
        .fold(None, |best: Option<TemplateHit>, hit| match best {
            Some(current) if current.score >= hit.score => Some(current),
            _ => Some(hit),
        })
}
