//! RGBA color type and channel interpolation.

use gridshade_core::{Error, Result};

/// RGBA color with channel values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Transparent black (used for nodata and shader misses)
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return Err(Error::InvalidConfiguration {
                name: "color",
                value: hex.to_string(),
                reason: "expected hex digits".to_string(),
            });
        }
        let channel = |i: usize| -> Result<u8> {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::InvalidConfiguration {
                name: "color",
                value: hex.to_string(),
                reason: "expected #rrggbb or #rrggbbaa".to_string(),
            })
        };
        match digits.len() {
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(Error::InvalidConfiguration {
                name: "color",
                value: hex.to_string(),
                reason: "expected 6 or 8 hex digits".to_string(),
            }),
        }
    }

    /// Linear interpolation per channel, `t` in [0, 1].
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| -> u8 { (a as f64 + (b as f64 - a as f64) * t).round() as u8 };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_rgb() {
        assert_eq!(Rgba::from_hex("#ffff00").unwrap(), Rgba::rgb(255, 255, 0));
        assert_eq!(Rgba::from_hex("00ff00").unwrap(), Rgba::rgb(0, 255, 0));
    }

    #[test]
    fn hex_rgba() {
        assert_eq!(
            Rgba::from_hex("#11223344").unwrap(),
            Rgba::new(0x11, 0x22, 0x33, 0x44)
        );
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(Rgba::from_hex("#zzz").is_err());
        assert!(Rgba::from_hex("#12345").is_err());
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgba::rgb(0, 0, 0);
        let b = Rgba::rgb(255, 255, 255);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgba::rgb(128, 128, 128));
    }
}
