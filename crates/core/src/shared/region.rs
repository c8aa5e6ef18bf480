use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::point::Point;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionParseError {
    #[error("expected 4 comma-separated values (left,top,width,height), got {0}")]
    Arity(usize),
    #[error("invalid integer '{0}' in region")]
    NotAnInteger(String),
    #[error("region width and height must be positive, got {width}x{height}")]
    EmptyArea { width: i32, height: i32 },
    #[error("region {0} extends past the coordinate range")]
    Overflow(String),
}

/// Capture/click area in screen pixel coordinates.
///
/// Detection works in coordinates local to the region; the click
/// dispatcher adds the origin back to get absolute screen positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Region covering a whole frame of the given size, anchored at the origin.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Widened so that edges past `i32::MAX` stay representable.
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Inclusive on both edges: a point on `right()`/`bottom()` is inside.
    pub fn contains(&self, point: Point) -> bool {
        let (x, y) = (point.x as i64, point.y as i64);
        (self.left as i64..=self.right()).contains(&x) && (self.top as i64..=self.bottom()).contains(&y)
    }

    /// Translates a region-local point into absolute coordinates, or `None`
    /// when the result does not fit in `i32`.
    pub fn to_absolute(&self, local: Point) -> Option<Point> {
        Some(Point::new(
            self.left.checked_add(local.x)?,
            self.top.checked_add(local.y)?,
        ))
    }
}

impl FromStr for Region {
    type Err = RegionParseError;

    /// Parses the `left,top,width,height` form used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(RegionParseError::Arity(parts.len()));
        }
        let mut values = [0i32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| RegionParseError::NotAnInteger(part.to_string()))?;
        }
        let [left, top, width, height] = values;
        if width <= 0 || height <= 0 {
            return Err(RegionParseError::EmptyArea { width, height });
        }
        if left.checked_add(width).is_none() || top.checked_add(height).is_none() {
            return Err(RegionParseError::Overflow(s.trim().to_string()));
        }
        Ok(Self::new(left, top, width, height))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.width, self.height)
    }
}
