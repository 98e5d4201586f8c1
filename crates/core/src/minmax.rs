//! Stretch-bounds policy: how a band's display min/max are derived.
//!
//! [`MinMaxOrigin`] is a plain value object selecting the limit algorithm
//! (raw min/max, cumulative cut, standard deviation), the extent the samples
//! come from, and the accuracy of the scan. It persists itself as a single
//! XML element with one attribute per field; reading is lenient and falls
//! back to defaults for anything missing or malformed, so older persisted
//! projects keep loading.

use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Tag of the persisted element
const XML_TAG: &str = "minMaxOrigin";

/// Default lower cumulative-cut fraction
pub const DEFAULT_CUMULATIVE_CUT_LOWER: f64 = 0.02;
/// Default upper cumulative-cut fraction
pub const DEFAULT_CUMULATIVE_CUT_UPPER: f64 = 0.98;
/// Default standard-deviation stretch factor
pub const DEFAULT_STD_DEV_FACTOR: f64 = 2.0;

/// How stretch limits are derived from band samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limits {
    /// No limit derivation requested; a raw scan is still performed
    None,
    /// Raw minimum/maximum of the scanned samples
    MinMax,
    /// Percentile bounds from a value histogram
    CumulativeCut,
    /// Mean ± factor · standard deviation
    StdDev,
}

impl Limits {
    /// Persisted name
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::MinMax => "MinMax",
            Self::CumulativeCut => "CumulativeCut",
            Self::StdDev => "StdDev",
        }
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "None" => Some(Self::None),
            "MinMax" => Some(Self::MinMax),
            "CumulativeCut" => Some(Self::CumulativeCut),
            "StdDev" => Some(Self::StdDev),
            _ => None,
        }
    }
}

/// Which part of the raster supplies the samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// Statistics over the full raster
    WholeRaster,
    /// Statistics recomputed for the currently displayed extent
    UpdatedCanvas,
}

impl Extent {
    /// Persisted name
    pub fn name(&self) -> &'static str {
        match self {
            Self::WholeRaster => "WholeRaster",
            Self::UpdatedCanvas => "UpdatedCanvas",
        }
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "WholeRaster" => Some(Self::WholeRaster),
            "UpdatedCanvas" => Some(Self::UpdatedCanvas),
            _ => None,
        }
    }
}

/// Accuracy of the statistics scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatAccuracy {
    /// Fixed-stride subsample scan
    Estimated,
    /// Every sample is scanned
    Exact,
}

impl StatAccuracy {
    /// Persisted name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Estimated => "Estimated",
            Self::Exact => "Exact",
        }
    }

    /// Parse a persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Estimated" => Some(Self::Estimated),
            "Exact" => Some(Self::Exact),
            _ => None,
        }
    }
}

/// Configuration value object for min/max derivation.
///
/// Equality is structural across all six fields. Fractional bounds are
/// validated at set time, so a constructed instance always satisfies
/// `0 <= lower < upper <= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxOrigin {
    limits: Limits,
    extent: Extent,
    stat_accuracy: StatAccuracy,
    cumulative_cut_lower: f64,
    cumulative_cut_upper: f64,
    std_dev_factor: f64,
}

impl Default for MinMaxOrigin {
    fn default() -> Self {
        Self {
            limits: Limits::None,
            extent: Extent::WholeRaster,
            stat_accuracy: StatAccuracy::Estimated,
            cumulative_cut_lower: DEFAULT_CUMULATIVE_CUT_LOWER,
            cumulative_cut_upper: DEFAULT_CUMULATIVE_CUT_UPPER,
            std_dev_factor: DEFAULT_STD_DEV_FACTOR,
        }
    }
}

impl MinMaxOrigin {
    /// Limit derivation algorithm
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Set the limit derivation algorithm
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    /// Sample extent
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Set the sample extent
    pub fn set_extent(&mut self, extent: Extent) {
        self.extent = extent;
    }

    /// Scan accuracy
    pub fn stat_accuracy(&self) -> StatAccuracy {
        self.stat_accuracy
    }

    /// Set the scan accuracy
    pub fn set_stat_accuracy(&mut self, accuracy: StatAccuracy) {
        self.stat_accuracy = accuracy;
    }

    /// Lower cumulative-cut fraction
    pub fn cumulative_cut_lower(&self) -> f64 {
        self.cumulative_cut_lower
    }

    /// Set the lower cumulative-cut fraction.
    ///
    /// Must satisfy `0 <= lower < upper`.
    pub fn set_cumulative_cut_lower(&mut self, lower: f64) -> Result<()> {
        if !lower.is_finite() || lower < 0.0 || lower >= self.cumulative_cut_upper {
            return Err(Error::InvalidConfiguration {
                name: "cumulativeCutLower",
                value: lower.to_string(),
                reason: format!(
                    "must be in [0, {}) (upper bound)",
                    self.cumulative_cut_upper
                ),
            });
        }
        self.cumulative_cut_lower = lower;
        Ok(())
    }

    /// Upper cumulative-cut fraction
    pub fn cumulative_cut_upper(&self) -> f64 {
        self.cumulative_cut_upper
    }

    /// Set the upper cumulative-cut fraction.
    ///
    /// Must satisfy `lower < upper <= 1`.
    pub fn set_cumulative_cut_upper(&mut self, upper: f64) -> Result<()> {
        if !upper.is_finite() || upper > 1.0 || upper <= self.cumulative_cut_lower {
            return Err(Error::InvalidConfiguration {
                name: "cumulativeCutUpper",
                value: upper.to_string(),
                reason: format!(
                    "must be in ({}, 1] (lower bound)",
                    self.cumulative_cut_lower
                ),
            });
        }
        self.cumulative_cut_upper = upper;
        Ok(())
    }

    /// Standard-deviation stretch factor
    pub fn std_dev_factor(&self) -> f64 {
        self.std_dev_factor
    }

    /// Set the standard-deviation stretch factor (non-negative, finite)
    pub fn set_std_dev_factor(&mut self, factor: f64) -> Result<()> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(Error::InvalidConfiguration {
                name: "stdDevFactor",
                value: factor.to_string(),
                reason: "must be a non-negative finite number".to_string(),
            });
        }
        self.std_dev_factor = factor;
        Ok(())
    }

    /// Write this policy as a `<minMaxOrigin>` element.
    pub fn write_xml<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut elem = BytesStart::new(XML_TAG);
        elem.push_attribute(("limits", self.limits.name()));
        elem.push_attribute(("extent", self.extent.name()));
        elem.push_attribute(("statAccuracy", self.stat_accuracy.name()));
        elem.push_attribute((
            "cumulativeCutLower",
            self.cumulative_cut_lower.to_string().as_str(),
        ));
        elem.push_attribute((
            "cumulativeCutUpper",
            self.cumulative_cut_upper.to_string().as_str(),
        ));
        elem.push_attribute(("stdDevFactor", self.std_dev_factor.to_string().as_str()));
        writer.write_event(Event::Empty(elem))?;
        Ok(())
    }

    /// Read a policy from a `<minMaxOrigin>` element.
    ///
    /// Never fails: a missing or unparseable attribute yields that field's
    /// default, which keeps older persisted documents loadable.
    pub fn read_xml(elem: &BytesStart) -> Self {
        let mut origin = Self::default();

        if let Some(name) = attr_text(elem, "limits") {
            if let Some(limits) = Limits::from_name(&name) {
                origin.limits = limits;
            }
        }
        if let Some(name) = attr_text(elem, "extent") {
            if let Some(extent) = Extent::from_name(&name) {
                origin.extent = extent;
            }
        }
        if let Some(name) = attr_text(elem, "statAccuracy") {
            if let Some(accuracy) = StatAccuracy::from_name(&name) {
                origin.stat_accuracy = accuracy;
            }
        }
        if let Some(text) = attr_text(elem, "cumulativeCutLower") {
            if let Ok(lower) = text.parse::<f64>() {
                origin.cumulative_cut_lower = lower;
            }
        }
        if let Some(text) = attr_text(elem, "cumulativeCutUpper") {
            if let Ok(upper) = text.parse::<f64>() {
                origin.cumulative_cut_upper = upper;
            }
        }
        if let Some(text) = attr_text(elem, "stdDevFactor") {
            if let Ok(factor) = text.parse::<f64>() {
                if factor.is_finite() && factor >= 0.0 {
                    origin.std_dev_factor = factor;
                }
            }
        }

        // Persisted fractions that break the invariant are discarded as a
        // pair so the object stays internally consistent.
        let lower = origin.cumulative_cut_lower;
        let upper = origin.cumulative_cut_upper;
        if !lower.is_finite() || !upper.is_finite() || lower < 0.0 || upper > 1.0 || lower >= upper
        {
            origin.cumulative_cut_lower = DEFAULT_CUMULATIVE_CUT_LOWER;
            origin.cumulative_cut_upper = DEFAULT_CUMULATIVE_CUT_UPPER;
        }

        origin
    }

    /// Serialize to an XML fragment string
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_xml(&mut writer)?;
        let bytes = writer.into_inner().into_inner();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Parse the first `<minMaxOrigin>` element found in an XML fragment.
    ///
    /// Errors only when the document is syntactically invalid or contains no
    /// such element; attribute-level problems fall back to defaults.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == XML_TAG.as_bytes() => {
                    return Ok(Self::read_xml(&e));
                }
                Event::Eof => {
                    return Err(Error::MalformedPersistedState {
                        what: format!("no <{XML_TAG}> element in document"),
                    });
                }
                _ => {}
            }
        }
    }
}

fn attr_text(elem: &BytesStart, name: &str) -> Option<String> {
    elem.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}
