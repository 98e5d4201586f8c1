//! Contrast enhancement: stretches raw band values into the 0..=255 display
//! range, with optional clipping.

use gridshade_core::{BandStatistics, Error, Result};

/// Enhancement algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContrastAlgorithm {
    /// Pass values through, truncated into 0..=255
    NoEnhancement,
    /// Linear stretch from [min, max] to 0..=255; out-of-range values clamp
    StretchToMinMax,
    /// Linear stretch, but out-of-range values produce no pixel
    StretchAndClipToMinMax,
    /// No stretch; out-of-range values produce no pixel
    ClipToMinMax,
}

/// A contrast enhancement configured with explicit display bounds.
///
/// Bounds usually come from [`BandStatistics`] via
/// [`from_statistics`](Self::from_statistics), but can be pinned explicitly
/// with the setters when reproducible output is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastEnhancement {
    algorithm: ContrastAlgorithm,
    minimum: f64,
    maximum: f64,
}

impl ContrastEnhancement {
    /// Create an enhancement with explicit bounds (`minimum <= maximum`).
    pub fn new(algorithm: ContrastAlgorithm, minimum: f64, maximum: f64) -> Result<Self> {
        if minimum.is_nan() || maximum.is_nan() || minimum > maximum {
            return Err(Error::InvalidConfiguration {
                name: "contrastEnhancement",
                value: format!("[{minimum}, {maximum}]"),
                reason: "bounds must satisfy minimum <= maximum".to_string(),
            });
        }
        Ok(Self {
            algorithm,
            minimum,
            maximum,
        })
    }

    /// Take display bounds from computed band statistics.
    pub fn from_statistics(algorithm: ContrastAlgorithm, stats: &BandStatistics) -> Self {
        Self {
            algorithm,
            minimum: stats.minimum,
            maximum: stats.maximum,
        }
    }

    pub fn algorithm(&self) -> ContrastAlgorithm {
        self.algorithm
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Override the lower display bound
    pub fn set_minimum(&mut self, minimum: f64) {
        self.minimum = minimum;
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Override the upper display bound
    pub fn set_maximum(&mut self, maximum: f64) {
        self.maximum = maximum;
    }

    /// Enhance a raw value into the display range.
    ///
    /// `None` means the pixel is not drawn (clipped, or NaN input).
    pub fn enhance(&self, value: f64) -> Option<u8> {
        if value.is_nan() {
            return None;
        }
        match self.algorithm {
            ContrastAlgorithm::NoEnhancement => Some(value.clamp(0.0, 255.0).round() as u8),
            ContrastAlgorithm::StretchToMinMax => Some(self.stretch(value)),
            ContrastAlgorithm::StretchAndClipToMinMax => {
                if value < self.minimum || value > self.maximum {
                    None
                } else {
                    Some(self.stretch(value))
                }
            }
            ContrastAlgorithm::ClipToMinMax => {
                if value < self.minimum || value > self.maximum {
                    None
                } else {
                    Some(value.clamp(0.0, 255.0).round() as u8)
                }
            }
        }
    }

    fn stretch(&self, value: f64) -> u8 {
        let span = self.maximum - self.minimum;
        if !(span > 0.0) || !span.is_finite() {
            return 0;
        }
        let t = ((value - self.minimum) / span).clamp(0.0, 1.0);
        (t * 255.0).round() as u8
    }
}
