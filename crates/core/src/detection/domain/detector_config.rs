use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which color family to segment.
///
/// `Green` uses the configured hue bounds. `Red` straddles the hue origin
/// and always uses the fixed sub-ranges from
/// [`RED_LOW_HUE`](crate::shared::constants::RED_LOW_HUE) and
/// [`RED_HIGH_HUE`](crate::shared::constants::RED_HIGH_HUE); the configured
/// hue bounds are ignored in that mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    #[default]
    Green,
    Red,
}

impl CellColor {
    pub fn wraps_hue(&self) -> bool {
        matches!(self, CellColor::Red)
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellColor::Green => write!(f, "green"),
            CellColor::Red => write!(f, "red"),
        }
    }
}

impl FromStr for CellColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(CellColor::Green),
            "red" => Ok(CellColor::Red),
            other => Err(format!("Cell color must be 'green' or 'red', got '{other}'")),
        }
    }
}

/// Inclusive HSV bounds. Hue is in 8-bit units `[0, 179]`, saturation and
/// value in `[0, 255]`.
///
/// `min <= max` per channel is not checked here; inverted bounds simply
/// select nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
}

impl ColorRange {
    pub fn hue_contains(&self, hue: u8) -> bool {
        (self.hue_min..=self.hue_max).contains(&hue)
    }

    pub fn sat_val_contains(&self, sat: u8, val: u8) -> bool {
        (self.sat_min..=self.sat_max).contains(&sat) && (self.val_min..=self.val_max).contains(&val)
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            hue_min: 40,
            hue_max: 80,
            sat_min: 50,
            sat_max: 255,
            val_min: 50,
            val_max: 255,
        }
    }
}

/// Inclusive bounds on blob area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeFilter {
    pub min_area: f64,
    pub max_area: f64,
}

impl SizeFilter {
    pub fn new(min_area: f64, max_area: f64) -> Self {
        Self { min_area, max_area }
    }

    pub fn accepts(&self, area: f64) -> bool {
        self.min_area <= area && area <= self.max_area
    }
}

impl Default for SizeFilter {
    fn default() -> Self {
        Self::new(100.0, 2000.0)
    }
}

/// Iteration counts for the erode-then-dilate cleanup. Zero disables a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphParams {
    pub erosion_iterations: u32,
    pub dilation_iterations: u32,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            erosion_iterations: 1,
            dilation_iterations: 1,
        }
    }
}

/// Everything a detection call needs besides the frame and color.
///
/// Treated as an immutable value: reconfiguring means building a new one
/// (see [`ConfigHandle`](crate::settings::config_handle::ConfigHandle)).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub color_range: ColorRange,
    pub size_filter: SizeFilter,
    pub circularity_threshold: f64,
    pub overlap_sensitivity: f64,
    pub morph: MorphParams,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            color_range: ColorRange::default(),
            size_filter: SizeFilter::default(),
            circularity_threshold: 0.7,
            overlap_sensitivity: 0.5,
            morph: MorphParams::default(),
        }
    }
}
