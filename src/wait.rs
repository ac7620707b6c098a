//! Wait/poll helpers
//!
//! Repeatedly capture a fresh image and search it until a needle shows up or
//! goes away, or the timeout runs out. Polling blocks the calling thread.

use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;
use crate::image::{Found, Image, Needle};
use crate::locator::Locator;

/// Provides a fresh image for every scan (typically a screenshot)
pub trait ImageSource {
    fn capture(&self) -> Result<Image>;
}

/// A fixed image is its own source
impl ImageSource for Image {
    fn capture(&self) -> Result<Image> {
        Ok(self.clone())
    }
}

/// How long and how often to scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub scans_per_second: f64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            scans_per_second: 3.0,
        }
    }
}

impl WaitOptions {
    pub fn new(timeout: Duration, scans_per_second: f64) -> Self {
        Self {
            timeout,
            scans_per_second,
        }
    }

    /// Number of scans: at least one, else `ceil(timeout * rate)`
    pub fn scan_count(&self) -> u64 {
        let rate = self.scans_per_second;
        if !rate.is_finite() || rate <= 0.0 {
            return 1;
        }
        let scans = (self.timeout.as_secs_f64() * rate).ceil();
        if scans < 1.0 {
            1
        } else {
            scans as u64
        }
    }

    /// Pause between two scans
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.scans_per_second).unwrap_or(Duration::ZERO)
    }
}

/// Run `scan` until `done` accepts its result, sleeping between scans.
///
/// Returns the accepted value, or `None` once every scan was rejected.
pub fn poll_until<T, S, D>(options: &WaitOptions, mut scan: S, mut done: D) -> Result<Option<T>>
where
    S: FnMut() -> Result<T>,
    D: FnMut(&T) -> bool,
{
    let scans = options.scan_count();
    for attempt in 0..scans {
        if attempt > 0 {
            thread::sleep(options.interval());
        }

        let value = scan()?;
        if done(&value) {
            debug!("Poll satisfied on scan {}/{}", attempt + 1, scans);
            return Ok(Some(value));
        }
    }

    debug!("Poll gave up after {} scan(s)", scans);
    Ok(None)
}

/// Best match from the first scan where any needle is found
pub fn wait_until_appears(
    source: &dyn ImageSource,
    locator: &Locator,
    needles: &[Needle],
    confidence: Option<f64>,
    options: &WaitOptions,
) -> Result<Option<Found>> {
    let found = poll_until(
        options,
        || source.capture()?.find(locator, needles, confidence),
        Option::is_some,
    )?;
    Ok(found.flatten())
}

/// Whether a scan found none of the needles before the timeout
pub fn wait_until_vanishes(
    source: &dyn ImageSource,
    locator: &Locator,
    needles: &[Needle],
    confidence: Option<f64>,
    options: &WaitOptions,
) -> Result<bool> {
    let vanished = poll_until(
        options,
        || source.capture()?.contains(locator, needles, confidence),
        |present| !present,
    )?;
    Ok(vanished.is_some())
}
