//! Transparency classification: value ranges mapped to opacity.

use gridshade_core::{Error, Result};

/// A value range with an associated transparency percentage.
///
/// Validated on construction: `min <= max`, percent in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransparentValueRange {
    min: f64,
    max: f64,
    percent_transparent: f64,
}

impl TransparentValueRange {
    pub fn new(min: f64, max: f64, percent_transparent: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(Error::InvalidConfiguration {
                name: "transparentValueRange",
                value: format!("[{min}, {max}]"),
                reason: "range must satisfy min <= max".to_string(),
            });
        }
        if !(0.0..=100.0).contains(&percent_transparent) {
            return Err(Error::InvalidConfiguration {
                name: "percentTransparent",
                value: percent_transparent.to_string(),
                reason: "must be in [0, 100]".to_string(),
            });
        }
        Ok(Self {
            min,
            max,
            percent_transparent,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn percent_transparent(&self) -> f64 {
        self.percent_transparent
    }

    fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Ordered list of transparent value ranges.
///
/// Classification scans ranges in stored order and the first match wins;
/// NaN and unmatched values are fully opaque.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterTransparency {
    ranges: Vec<TransparentValueRange>,
}

impl RasterTransparency {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configured ranges, in classification order
    pub fn ranges(&self) -> &[TransparentValueRange] {
        &self.ranges
    }

    /// Replace the range list. Ranges were validated on construction, so
    /// order is the only thing that matters here.
    pub fn set_ranges(&mut self, ranges: Vec<TransparentValueRange>) {
        self.ranges = ranges;
    }

    /// Whether no ranges are configured
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Opacity percentage in [0, 100] for a pixel value.
    ///
    /// 100 means fully opaque (0% transparent).
    pub fn opacity_for(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 100.0;
        }
        for range in &self.ranges {
            if range.contains(value) {
                return 100.0 - range.percent_transparent;
            }
        }
        100.0
    }

    /// Scale a global alpha by the matched range's transparency.
    ///
    /// This is the renderer-facing form: `default_alpha` is the layer-level
    /// alpha and is returned unchanged when no range matches.
    pub fn alpha_value(&self, value: f64, default_alpha: u8) -> u8 {
        (default_alpha as f64 * self.opacity_for(value) / 100.0).round() as u8
    }
}
