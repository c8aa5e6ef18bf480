use serde::{Deserialize, Serialize};

use crate::detection::domain::detector_config::{
    CellColor, ColorRange, DetectorConfig, MorphParams, SizeFilter,
};
use crate::settings::settings_error::SettingsError;
use crate::shared::constants::MAX_HUE;
use crate::shared::region::Region;

/// Flat, persisted form of the detector parameters.
///
/// Key names are fixed by the on-disk format: top-level keys are
/// snake_case, nested keys camelCase. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub cell_color: CellColor,
    pub hsv_range: HsvRangeSettings,
    pub size_filter: SizeFilterSettings,
    pub circularity: f64,
    pub overlap_sensitivity: f64,
    pub morph_operations: MorphSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HsvRangeSettings {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub sat_max: u8,
    pub val_min: u8,
    pub val_max: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeFilterSettings {
    pub min_size: f64,
    pub max_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphSettings {
    pub erosion: u32,
    pub dilation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSettings {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default(), CellColor::default(), None)
    }
}

impl Default for HsvRangeSettings {
    fn default() -> Self {
        ColorRange::default().into()
    }
}

impl Default for SizeFilterSettings {
    fn default() -> Self {
        SizeFilter::default().into()
    }
}

impl Default for MorphSettings {
    fn default() -> Self {
        MorphParams::default().into()
    }
}

impl From<ColorRange> for HsvRangeSettings {
    fn from(r: ColorRange) -> Self {
        Self {
            hue_min: r.hue_min,
            hue_max: r.hue_max,
            sat_min: r.sat_min,
            sat_max: r.sat_max,
            val_min: r.val_min,
            val_max: r.val_max,
        }
    }
}

impl From<HsvRangeSettings> for ColorRange {
    fn from(s: HsvRangeSettings) -> Self {
        Self {
            hue_min: s.hue_min,
            hue_max: s.hue_max,
            sat_min: s.sat_min,
            sat_max: s.sat_max,
            val_min: s.val_min,
            val_max: s.val_max,
        }
    }
}

impl From<SizeFilter> for SizeFilterSettings {
    fn from(f: SizeFilter) -> Self {
        Self {
            min_size: f.min_area,
            max_size: f.max_area,
        }
    }
}

impl From<MorphParams> for MorphSettings {
    fn from(m: MorphParams) -> Self {
        Self {
            erosion: m.erosion_iterations,
            dilation: m.dilation_iterations,
        }
    }
}

impl From<Region> for RegionSettings {
    fn from(r: Region) -> Self {
        Self {
            x: r.left,
            y: r.top,
            width: r.width,
            height: r.height,
        }
    }
}

impl From<RegionSettings> for Region {
    fn from(r: RegionSettings) -> Self {
        Region::new(r.x, r.y, r.width, r.height)
    }
}

impl DetectorSettings {
    pub fn from_config(config: &DetectorConfig, color: CellColor, region: Option<Region>) -> Self {
        Self {
            cell_color: color,
            hsv_range: config.color_range.into(),
            size_filter: config.size_filter.into(),
            circularity: config.circularity_threshold,
            overlap_sensitivity: config.overlap_sensitivity,
            morph_operations: config.morph.into(),
            region: region.map(RegionSettings::from),
        }
    }

    pub fn to_config(&self) -> DetectorConfig {
        DetectorConfig {
            color_range: self.hsv_range.into(),
            size_filter: SizeFilter::new(self.size_filter.min_size, self.size_filter.max_size),
            circularity_threshold: self.circularity,
            overlap_sensitivity: self.overlap_sensitivity,
            morph: MorphParams {
                erosion_iterations: self.morph_operations.erosion,
                dilation_iterations: self.morph_operations.dilation,
            },
        }
    }

    pub fn region(&self) -> Option<Region> {
        self.region.map(Region::from)
    }

    /// Range checks that the type system does not already enforce.
    ///
    /// Ordering of min/max pairs is not checked: inverted bounds are legal
    /// and select nothing.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let hsv = &self.hsv_range;
        for (field, value) in [("hsv_range.hueMin", hsv.hue_min), ("hsv_range.hueMax", hsv.hue_max)] {
            if value > MAX_HUE {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("{value} exceeds {MAX_HUE}"),
                });
            }
        }
        for (field, value) in [
            ("circularity", self.circularity),
            ("overlap_sensitivity", self.overlap_sensitivity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        for (field, value) in [
            ("size_filter.minSize", self.size_filter.min_size),
            ("size_filter.maxSize", self.size_filter.max_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("{value} must be a non-negative number"),
                });
            }
        }
        if let Some(region) = &self.region {
            if region.width <= 0 || region.height <= 0 {
                return Err(SettingsError::Invalid {
                    field: "region",
                    reason: format!(
                        "width and height must be positive, got {}x{}",
                        region.width, region.height
                    ),
                });
            }
        }
        Ok(())
    }
}
