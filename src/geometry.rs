//! Geometry primitives
//!
//! Immutable pixel coordinates shared by every other layer. Regions are
//! allowed to have negative width or height: OCR glue segments that bridge a
//! line wrap legitimately end to the left of where they start.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LocateError, Result};

/// A pixel location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build a point from an `(x, y)` tuple
    pub fn from_tuple((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        dx.hypot(dy)
    }

    /// Shift by the given amounts
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from(value: (i32, i32)) -> Self {
        Self::from_tuple(value)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How much of an inner region must lie within an outer one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlap {
    /// Every corner must be inside (inclusive)
    #[default]
    All,
    /// Any overlap, touching edges included
    Any,
}

impl FromStr for Overlap {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Overlap::All),
            "any" => Ok(Overlap::Any),
            other => Err(LocateError::InvalidOverlap(other.to_string())),
        }
    }
}

/// One edge or extent of a sub-region request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    /// Pixels
    Absolute(i32),
    /// Fraction of the parent width (left/width) or height (top/height), truncated
    Fraction(f64),
}

impl Extent {
    fn resolve(self, full: i32) -> i32 {
        match self {
            Extent::Absolute(value) => value,
            Extent::Fraction(fraction) => (full as f64 * fraction) as i32,
        }
    }
}

/// Sub-region request; unset edges start at the parent's origin and unset
/// extents run to the parent's far edge
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubRegion {
    pub left: Option<Extent>,
    pub top: Option<Extent>,
    pub width: Option<Extent>,
    pub height: Option<Extent>,
}

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from its edges. Inverted edges give a negative size.
    pub const fn from_coordinates(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Build a region from its top-left and bottom-right corners
    pub const fn from_points(min: Point, max: Point) -> Self {
        Self::from_coordinates(min.x, min.y, max.x, max.y)
    }

    /// Smallest region covering every given region, `None` when empty
    pub fn bounding<I>(regions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Region>,
    {
        regions.into_iter().reduce(|acc, region| acc.union(&region))
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub const fn min_point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn max_point(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Midpoint, rounded towards negative infinity
    pub fn center(&self) -> Point {
        Point::new(
            (self.left() + self.right()).div_euclid(2),
            (self.top() + self.bottom()).div_euclid(2),
        )
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.left(), self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    /// Inclusive containment on all four edges
    pub fn contains_point(&self, point: Point) -> bool {
        self.left() <= point.x
            && point.x <= self.right()
            && self.top() <= point.y
            && point.y <= self.bottom()
    }

    /// Containment of another region under the given overlap mode
    pub fn contains_region(&self, other: &Region, overlap: Overlap) -> bool {
        match overlap {
            Overlap::All => other.corners().iter().all(|corner| self.contains_point(*corner)),
            Overlap::Any => {
                other.left() <= self.right()
                    && other.right() >= self.left()
                    && other.top() <= self.bottom()
                    && other.bottom() >= self.top()
            }
        }
    }

    /// Same as [`Region::contains_region`] with the mode given by name
    pub fn contains_region_with(&self, other: &Region, overlap: &str) -> Result<bool> {
        let overlap: Overlap = overlap.parse()?;
        Ok(self.contains_region(other, overlap))
    }

    /// Min/max union; works for negative sizes because it only compares edges
    pub fn union(&self, other: &Region) -> Region {
        Region::from_coordinates(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Same area with non-negative width and height
    pub fn normalized(&self) -> Region {
        Region::from_coordinates(
            self.left().min(self.right()),
            self.top().min(self.bottom()),
            self.left().max(self.right()),
            self.top().max(self.bottom()),
        )
    }

    /// Shift by the given amounts
    pub fn offset(&self, dx: i32, dy: i32) -> Region {
        Region::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Move a region expressed relative to `origin` into `origin`'s space
    pub fn translate(&self, origin: Point) -> Region {
        self.offset(origin.x, origin.y)
    }

    /// Resolve a sub-region request against this region
    pub fn sub_region(&self, request: SubRegion) -> Region {
        let left = request.left.map_or(0, |e| e.resolve(self.width));
        let top = request.top.map_or(0, |e| e.resolve(self.height));
        let width = request
            .width
            .map_or(self.width - left, |e| e.resolve(self.width));
        let height = request
            .height
            .map_or(self.height - top, |e| e.resolve(self.height));

        Region::new(self.x + left, self.y + top, width, height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region(x={}, y={}, width={}, height={})",
            self.x, self.y, self.width, self.height
        )
    }
}
