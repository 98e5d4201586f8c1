//! The color ramp shader: ordered color stops evaluated in one of three
//! ramp modes.

use gridshade_core::{Error, Result};

use crate::color::Rgba;

/// Color mapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampType {
    /// Smooth per-channel interpolation between bracketing stops
    Interpolated,
    /// Step function: first stop whose value is >= the input
    Discrete,
    /// Lookup only: exact stop value matches
    Exact,
}

/// A color stop: raw pixel value mapped to a color, with a legend label.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRampItem {
    pub value: f64,
    pub color: Rgba,
    pub label: String,
}

impl ColorRampItem {
    pub fn new(value: f64, color: Rgba, label: impl Into<String>) -> Self {
        Self {
            value,
            color,
            label: label.into(),
        }
    }
}

/// Maps a pixel value to an RGBA color via an ordered-by-value stop list.
///
/// The shader owns its stops by value; replacing a renderer's shader drops
/// the previous stop list wholesale, so no stale interpolation state can
/// survive a reassignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRampShader {
    ramp_type: RampType,
    items: Vec<ColorRampItem>,
    clip: bool,
    minimum: f64,
    maximum: f64,
}

impl Default for ColorRampShader {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorRampShader {
    /// An interpolated shader with no stops (shades nothing until
    /// [`set_items`](Self::set_items) is called) and the default 0..=255
    /// classification window.
    pub fn new() -> Self {
        Self::with_range(0.0, 255.0)
    }

    /// An interpolated shader with an explicit classification window.
    pub fn with_range(minimum: f64, maximum: f64) -> Self {
        Self {
            ramp_type: RampType::Interpolated,
            items: Vec::new(),
            clip: false,
            minimum,
            maximum,
        }
    }

    /// Ramp mode
    pub fn ramp_type(&self) -> RampType {
        self.ramp_type
    }

    /// Set the ramp mode
    pub fn set_ramp_type(&mut self, ramp_type: RampType) {
        self.ramp_type = ramp_type;
    }

    /// Whether interpolated shading returns no color outside the stop domain
    /// instead of clamping to the nearest stop
    pub fn clip(&self) -> bool {
        self.clip
    }

    /// Set clip behavior for interpolated shading
    pub fn set_clip(&mut self, clip: bool) {
        self.clip = clip;
    }

    /// The stop list, sorted ascending by value
    pub fn items(&self) -> &[ColorRampItem] {
        &self.items
    }

    /// Replace the stop list. Stops are sorted by value; non-finite stop
    /// values are rejected.
    pub fn set_items(&mut self, mut items: Vec<ColorRampItem>) -> Result<()> {
        for item in &items {
            if !item.value.is_finite() {
                return Err(Error::InvalidConfiguration {
                    name: "colorRampItem",
                    value: item.value.to_string(),
                    reason: "stop value must be finite".to_string(),
                });
            }
        }
        items.sort_by(|a, b| a.value.total_cmp(&b.value));
        self.items = items;
        Ok(())
    }

    /// Lowest stop value, if any stops are set
    pub fn minimum_item_value(&self) -> Option<f64> {
        self.items.first().map(|item| item.value)
    }

    /// Highest stop value, if any stops are set
    pub fn maximum_item_value(&self) -> Option<f64> {
        self.items.last().map(|item| item.value)
    }

    /// Lower bound of the classification window
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Set the lower bound of the classification window
    pub fn set_minimum(&mut self, minimum: f64) {
        self.minimum = minimum;
    }

    /// Upper bound of the classification window
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Set the upper bound of the classification window
    pub fn set_maximum(&mut self, maximum: f64) {
        self.maximum = maximum;
    }

    /// Normalize a raw value into [0, 1] against the classification window.
    ///
    /// NaN input and degenerate windows normalize to 0.
    pub fn stretch(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        let span = self.maximum - self.minimum;
        if !(span > 0.0) || !span.is_finite() {
            return 0.0;
        }
        ((value - self.minimum) / span).clamp(0.0, 1.0)
    }

    /// Map a pixel value to a color.
    ///
    /// Returns `None` for NaN input, an empty stop list, exact/discrete
    /// misses, and (with `clip`) interpolated values outside the stop domain.
    pub fn shade(&self, value: f64) -> Option<Rgba> {
        if value.is_nan() || self.items.is_empty() {
            return None;
        }
        match self.ramp_type {
            RampType::Interpolated => self.shade_interpolated(value),
            RampType::Discrete => self
                .items
                .iter()
                .find(|item| value <= item.value)
                .map(|item| item.color),
            RampType::Exact => self
                .items
                .iter()
                .find(|item| item.value == value)
                .map(|item| item.color),
        }
    }

    fn shade_interpolated(&self, value: f64) -> Option<Rgba> {
        let first = &self.items[0];
        let last = &self.items[self.items.len() - 1];

        if value <= first.value {
            if self.clip && value < first.value {
                return None;
            }
            return Some(first.color);
        }
        if value >= last.value {
            if self.clip && value > last.value {
                return None;
            }
            return Some(last.color);
        }

        for pair in self.items.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if value <= hi.value {
                let span = hi.value - lo.value;
                if span <= 0.0 {
                    // duplicate stop values
                    return Some(hi.color);
                }
                let t = (value - lo.value) / span;
                return Some(lo.color.lerp(hi.color, t));
            }
        }
        Some(last.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stop_shader(ramp_type: RampType) -> ColorRampShader {
        let mut shader = ColorRampShader::new();
        shader.set_ramp_type(ramp_type);
        shader
            .set_items(vec![
                ColorRampItem::new(10.0, Rgba::from_hex("#ffff00").unwrap(), "foo"),
                ColorRampItem::new(100.0, Rgba::from_hex("#ff00ff").unwrap(), "bar"),
                ColorRampItem::new(1000.0, Rgba::from_hex("#00ff00").unwrap(), "kazam"),
            ])
            .unwrap();
        shader
    }

    #[test]
    fn interpolated_hits_stops_exactly() {
        let shader = three_stop_shader(RampType::Interpolated);
        assert_eq!(shader.shade(10.0), Some(Rgba::rgb(255, 255, 0)));
        assert_eq!(shader.shade(100.0), Some(Rgba::rgb(255, 0, 255)));
        assert_eq!(shader.shade(1000.0), Some(Rgba::rgb(0, 255, 0)));
    }

    #[test]
    fn interpolated_midpoint_between_stops() {
        let shader = three_stop_shader(RampType::Interpolated);
        // halfway between stop 1 (#ffff00) and stop 2 (#ff00ff)
        let color = shader.shade(55.0).unwrap();
        assert_eq!(color.r, 255);
        assert!(color.g > 0 && color.g < 255, "g = {}", color.g);
        assert!(color.b > 0 && color.b < 255, "b = {}", color.b);
    }

    #[test]
    fn interpolated_clamps_outside_domain() {
        let shader = three_stop_shader(RampType::Interpolated);
        assert_eq!(shader.shade(-5.0), Some(Rgba::rgb(255, 255, 0)));
        assert_eq!(shader.shade(5000.0), Some(Rgba::rgb(0, 255, 0)));
    }

    #[test]
    fn interpolated_clip_returns_no_color_outside_domain() {
        let mut shader = three_stop_shader(RampType::Interpolated);
        shader.set_clip(true);
        assert_eq!(shader.shade(-5.0), None);
        assert_eq!(shader.shade(5000.0), None);
        // boundaries themselves still shade
        assert_eq!(shader.shade(10.0), Some(Rgba::rgb(255, 255, 0)));
    }

    #[test]
    fn discrete_step_function() {
        let shader = three_stop_shader(RampType::Discrete);
        assert_eq!(shader.shade(5.0), Some(Rgba::rgb(255, 255, 0)));
        assert_eq!(shader.shade(10.0), Some(Rgba::rgb(255, 255, 0)));
        assert_eq!(shader.shade(55.0), Some(Rgba::rgb(255, 0, 255)));
        assert_eq!(shader.shade(500.0), Some(Rgba::rgb(0, 255, 0)));
        assert_eq!(shader.shade(1001.0), None);
    }

    #[test]
    fn exact_lookup_only() {
        let shader = three_stop_shader(RampType::Exact);
        assert_eq!(shader.shade(100.0), Some(Rgba::rgb(255, 0, 255)));
        assert_eq!(shader.shade(99.9), None);
    }

    #[test]
    fn nan_and_empty_shade_nothing() {
        let shader = three_stop_shader(RampType::Interpolated);
        assert_eq!(shader.shade(f64::NAN), None);
        assert_eq!(ColorRampShader::new().shade(50.0), None);
    }

    #[test]
    fn set_items_sorts_by_value() {
        let mut shader = ColorRampShader::new();
        shader
            .set_items(vec![
                ColorRampItem::new(1000.0, Rgba::rgb(0, 255, 0), "high"),
                ColorRampItem::new(10.0, Rgba::rgb(255, 255, 0), "low"),
            ])
            .unwrap();
        assert_eq!(shader.minimum_item_value(), Some(10.0));
        assert_eq!(shader.maximum_item_value(), Some(1000.0));
    }

    #[test]
    fn stretch_normalizes_against_window() {
        let shader = ColorRampShader::with_range(0.0, 200.0);
        assert_eq!(shader.stretch(0.0), 0.0);
        assert!((shader.stretch(100.0) - 0.5).abs() < 1e-12);
        assert_eq!(shader.stretch(200.0), 1.0);
        // values outside the window clamp
        assert_eq!(shader.stretch(-50.0), 0.0);
        assert_eq!(shader.stretch(300.0), 1.0);
    }

    #[test]
    fn stretch_window_is_settable() {
        let mut shader = ColorRampShader::new();
        assert_eq!(shader.minimum(), 0.0);
        assert_eq!(shader.maximum(), 255.0);
        shader.set_minimum(-1.0);
        shader.set_maximum(1.0);
        assert!((shader.stretch(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn stretch_degenerate_window_and_nan() {
        let shader = ColorRampShader::with_range(5.0, 5.0);
        assert_eq!(shader.stretch(5.0), 0.0);
        let shader = ColorRampShader::with_range(0.0, 1.0);
        assert_eq!(shader.stretch(f64::NAN), 0.0);
    }

    #[test]
    fn set_items_rejects_non_finite_stops() {
        let mut shader = ColorRampShader::new();
        let result = shader.set_items(vec![ColorRampItem::new(
            f64::NAN,
            Rgba::rgb(0, 0, 0),
            "bad",
        )]);
        assert!(result.is_err());
    }
}
