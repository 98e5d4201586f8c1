//! Band statistics and stretch-bound derivation.
//!
//! A single sequential pass computes min/max and Welford mean/variance over
//! the unmasked samples; cumulative-cut bounds need a second pass to fill a
//! fixed-bin histogram and invert its CDF. Accumulation order is row-major
//! left-to-right, so results are reproducible across runs and platforms.

use tracing::debug;

use crate::block::BandBlock;
use crate::error::{Error, Result};
use crate::minmax::{Limits, MinMaxOrigin, StatAccuracy};

/// Stride used for `StatAccuracy::Estimated` scans: every Nth raw sample is
/// considered. Trades accuracy for speed on large blocks.
pub const ESTIMATE_STRIDE: usize = 8;

/// Number of histogram bins for cumulative-cut inversion
const HISTOGRAM_BINS: usize = 4096;

/// Statistics for one band, with stretch bounds derived per the active
/// [`MinMaxOrigin`] policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStatistics {
    /// Lower stretch bound
    pub minimum: f64,
    /// Upper stretch bound
    pub maximum: f64,
    /// Mean of the scanned samples
    pub mean: f64,
    /// Population standard deviation of the scanned samples
    pub std_dev: f64,
    /// Number of samples that entered the statistics
    pub count: usize,
}

/// Compute band statistics over a sample block.
///
/// Masked (no-data / NaN) samples are excluded before any statistic is
/// computed. Fails with [`Error::InsufficientData`] when nothing remains.
pub fn band_statistics(block: &BandBlock, origin: &MinMaxOrigin) -> Result<BandStatistics> {
    let stride = match origin.stat_accuracy() {
        StatAccuracy::Exact => 1,
        StatAccuracy::Estimated => ESTIMATE_STRIDE,
    };
    let samples = || {
        block
            .values()
            .iter()
            .copied()
            .step_by(stride)
            .filter(|v| !block.is_nodata(*v))
    };

    let mut count: usize = 0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;

    for v in samples() {
        count += 1;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
        // Welford's online algorithm, sequential for determinism
        let delta = v - mean;
        mean += delta / count as f64;
        m2 += delta * (v - mean);
    }

    if count == 0 {
        return Err(Error::InsufficientData {
            context: "no unmasked samples in block",
        });
    }

    let std_dev = if count > 1 {
        (m2 / count as f64).sqrt()
    } else {
        0.0
    };

    let (minimum, maximum) = match origin.limits() {
        Limits::None | Limits::MinMax => (min, max),
        Limits::StdDev => {
            let factor = origin.std_dev_factor();
            (mean - factor * std_dev, mean + factor * std_dev)
        }
        Limits::CumulativeCut => cumulative_cut_bounds(
            samples(),
            count,
            min,
            max,
            origin.cumulative_cut_lower(),
            origin.cumulative_cut_upper(),
        ),
    };

    debug!(
        count,
        minimum,
        maximum,
        mean,
        std_dev,
        limits = origin.limits().name(),
        "band statistics computed"
    );

    Ok(BandStatistics {
        minimum,
        maximum,
        mean,
        std_dev,
        count,
    })
}

/// Invert a fixed-bin histogram CDF at the lower and upper fractions.
///
/// Percentile positions interpolate linearly inside their bin, so the result
/// is accurate to roughly one bin width.
fn cumulative_cut_bounds<I>(
    samples: I,
    count: usize,
    min: f64,
    max: f64,
    lower: f64,
    upper: f64,
) -> (f64, f64)
where
    I: Iterator<Item = f64>,
{
    let span = max - min;
    if !(span > 0.0) || !span.is_finite() {
        // all samples equal (or pathological span): nothing to cut
        return (min, max);
    }

    let mut hist = vec![0u64; HISTOGRAM_BINS];
    let inv_span = 1.0 / span;
    for v in samples {
        let t = ((v - min) * inv_span).clamp(0.0, 1.0);
        let idx = ((t * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1);
        hist[idx] += 1;
    }

    let percentile = |p: f64| -> f64 {
        let target = ((p * count as f64).floor() as u64).min(count as u64 - 1);
        let bin_width = span / HISTOGRAM_BINS as f64;
        let mut cumsum: u64 = 0;
        for (b, &h) in hist.iter().enumerate() {
            let next = cumsum + h;
            if target < next {
                let within = target - cumsum;
                let frac = if h > 0 { within as f64 / h as f64 } else { 0.0 };
                return min + b as f64 * bin_width + frac * bin_width;
            }
            cumsum = next;
        }
        max
    };

    (percentile(lower), percentile(upper))
}
