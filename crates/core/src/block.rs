//! Band sample blocks and the sample-source contract.
//!
//! A [`BandBlock`] holds one band's pixel samples together with an optional
//! no-data marker. Renderers and statistics never fetch pixels themselves;
//! they consume blocks handed to them through a [`SampleSource`].

use crate::error::{Error, Result};
use ndarray::Array2;

/// A single band's pixel samples in row-major order, with an optional
/// no-data value.
///
/// NaN samples are always treated as no-data, independent of the marker.
#[derive(Debug, Clone)]
pub struct BandBlock {
    data: Array2<f64>,
    nodata: Option<f64>,
}

impl BandBlock {
    /// Create a new block filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
            nodata: None,
        }
    }

    /// Create a new block filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            nodata: None,
        }
    }

    /// Create a block from existing samples
    pub fn from_vec(values: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        let data = Array2::from_shape_vec((rows, cols), values).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;
        Ok(Self { data, nodata: None })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of samples, masked or not
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block holds no samples at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let (rows, cols) = self.shape();
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            }),
        }
    }

    /// Raw sample grid
    pub fn values(&self) -> &Array2<f64> {
        &self.data
    }

    /// Mutable raw sample grid
    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }

    /// The no-data marker, if any
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Set the no-data marker
    pub fn set_nodata(&mut self, nodata: Option<f64>) {
        self.nodata = nodata;
    }

    /// Whether a sample is masked (NaN is always masked)
    pub fn is_nodata(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        match self.nodata {
            Some(nd) => value == nd,
            None => false,
        }
    }

    /// Iterate over unmasked samples in row-major order.
    ///
    /// Statistics rely on this order being deterministic.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data
            .iter()
            .copied()
            .filter(move |v| !self.is_nodata(*v))
    }
}

/// The input collaborator: something that can supply per-band sample blocks.
///
/// Band numbers are 1-based, matching raster conventions.
pub trait SampleSource: Send + Sync {
    /// Number of bands available
    fn band_count(&self) -> usize;

    /// The sample block for the given 1-based band
    fn block(&self, band: usize) -> Result<&BandBlock>;
}

/// An in-memory multi-band sample source.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    bands: Vec<BandBlock>,
}

impl MemoryRaster {
    /// Create a source from pre-built band blocks.
    ///
    /// All bands must share the same shape.
    pub fn new(bands: Vec<BandBlock>) -> Result<Self> {
        if bands.is_empty() {
            return Err(Error::InsufficientData {
                context: "memory raster needs at least one band",
            });
        }
        let shape = bands[0].shape();
        for band in &bands[1..] {
            if band.shape() != shape {
                return Err(Error::InvalidDimensions {
                    width: band.cols(),
                    height: band.rows(),
                });
            }
        }
        Ok(Self { bands })
    }

    /// Convenience constructor for a single-band source
    pub fn single(block: BandBlock) -> Self {
        Self { bands: vec![block] }
    }
}

impl SampleSource for MemoryRaster {
    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn block(&self, band: usize) -> Result<&BandBlock> {
        if band == 0 || band > self.bands.len() {
            return Err(Error::BandOutOfRange {
                band,
                bands: self.bands.len(),
            });
        }
        Ok(&self.bands[band - 1])
    }
}
