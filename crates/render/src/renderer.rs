//! Single-band renderers: per-pixel classification of band samples into a
//! premultiplied RGBA buffer.

use rayon::prelude::*;

use gridshade_colormap::{ColorRampShader, Rgba};
use gridshade_core::{BandBlock, Error, Result, SampleSource};

use crate::contrast::ContrastEnhancement;
use crate::transparency::RasterTransparency;

/// A rows x cols RGBA8 buffer in row-major order, premultiplied alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl RgbaImage {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Raw pixel bytes, `rows * cols * 4` long
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume into the raw byte buffer
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// The RGBA bytes of one pixel
    pub fn pixel(&self, row: usize, col: usize) -> Result<[u8; 4]> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let offset = (row * self.cols + col) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + 4]);
        Ok(px)
    }
}

/// A renderer turns band samples into an RGBA image.
///
/// Implementations hold their configuration by value and are immutable
/// during a render pass, so independent invocations may run in parallel.
pub trait RasterRenderer: Send + Sync {
    /// Render the source into a premultiplied RGBA buffer
    fn render(&self, source: &dyn SampleSource) -> Result<RgbaImage>;

    /// Which 1-based bands this renderer reads
    fn uses_bands(&self) -> Vec<usize>;
}

/// Row-parallel render kernel. No-data samples become transparent pixels.
fn render_pixels<F>(block: &BandBlock, pixel: F) -> RgbaImage
where
    F: Fn(f64) -> [u8; 4] + Sync,
{
    let rows = block.rows();
    let cols = block.cols();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols * 4];
            for col in 0..cols {
                let v = block.values()[[row, col]];
                if block.is_nodata(v) {
                    continue;
                }
                let px = pixel(v);
                row_data[col * 4..col * 4 + 4].copy_from_slice(&px);
            }
            row_data
        })
        .collect();

    RgbaImage { rows, cols, data }
}

/// Premultiply a shaded color by the classified alpha.
fn premultiplied(color: Rgba, alpha: u8) -> [u8; 4] {
    let a = color.a as f64 * alpha as f64 / 255.0;
    let scale = a / 255.0;
    [
        (color.r as f64 * scale).round() as u8,
        (color.g as f64 * scale).round() as u8,
        (color.b as f64 * scale).round() as u8,
        a.round() as u8,
    ]
}

fn check_band(band: usize) -> Result<()> {
    if band == 0 {
        return Err(Error::InvalidConfiguration {
            name: "band",
            value: band.to_string(),
            reason: "band numbers are 1-based".to_string(),
        });
    }
    Ok(())
}

fn check_opacity(opacity: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(Error::InvalidConfiguration {
            name: "opacity",
            value: opacity.to_string(),
            reason: "must be in [0, 1]".to_string(),
        });
    }
    Ok(())
}

/// Pseudo-color renderer: shades one band through a color ramp, then applies
/// the transparency classifier and global opacity.
#[derive(Debug, Clone)]
pub struct SingleBandPseudoColorRenderer {
    band: usize,
    shader: ColorRampShader,
    transparency: Option<RasterTransparency>,
    opacity: f64,
}

impl SingleBandPseudoColorRenderer {
    pub fn new(band: usize, shader: ColorRampShader) -> Result<Self> {
        check_band(band)?;
        Ok(Self {
            band,
            shader,
            transparency: None,
            opacity: 1.0,
        })
    }

    pub fn band(&self) -> usize {
        self.band
    }

    pub fn set_band(&mut self, band: usize) -> Result<()> {
        check_band(band)?;
        self.band = band;
        Ok(())
    }

    pub fn shader(&self) -> &ColorRampShader {
        &self.shader
    }

    /// Replace the shader wholesale. The old shader and its stop list are
    /// dropped before this returns; nothing of the previous configuration
    /// remains reachable.
    pub fn set_shader(&mut self, shader: ColorRampShader) {
        self.shader = shader;
    }

    pub fn raster_transparency(&self) -> Option<&RasterTransparency> {
        self.transparency.as_ref()
    }

    pub fn set_raster_transparency(&mut self, transparency: Option<RasterTransparency>) {
        self.transparency = transparency;
    }

    /// Global opacity in [0, 1]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<()> {
        check_opacity(opacity)?;
        self.opacity = opacity;
        Ok(())
    }
}

impl RasterRenderer for SingleBandPseudoColorRenderer {
    fn render(&self, source: &dyn SampleSource) -> Result<RgbaImage> {
        let block = source.block(self.band)?;
        let global_alpha = (self.opacity * 255.0).round() as u8;

        Ok(render_pixels(block, |v| match self.shader.shade(v) {
            None => [0, 0, 0, 0],
            Some(color) => {
                let alpha = match &self.transparency {
                    Some(t) => t.alpha_value(v, global_alpha),
                    None => global_alpha,
                };
                premultiplied(color, alpha)
            }
        }))
    }

    fn uses_bands(&self) -> Vec<usize> {
        vec![self.band]
    }
}

/// Grayscale renderer: contrast-enhances one band into 0..=255, then applies
/// the transparency classifier and global opacity.
#[derive(Debug, Clone)]
pub struct SingleBandGrayRenderer {
    band: usize,
    contrast: ContrastEnhancement,
    transparency: Option<RasterTransparency>,
    opacity: f64,
}

impl SingleBandGrayRenderer {
    pub fn new(band: usize, contrast: ContrastEnhancement) -> Result<Self> {
        check_band(band)?;
        Ok(Self {
            band,
            contrast,
            transparency: None,
            opacity: 1.0,
        })
    }

    pub fn band(&self) -> usize {
        self.band
    }

    pub fn contrast_enhancement(&self) -> &ContrastEnhancement {
        &self.contrast
    }

    pub fn contrast_enhancement_mut(&mut self) -> &mut ContrastEnhancement {
        &mut self.contrast
    }

    pub fn set_contrast_enhancement(&mut self, contrast: ContrastEnhancement) {
        self.contrast = contrast;
    }

    pub fn raster_transparency(&self) -> Option<&RasterTransparency> {
        self.transparency.as_ref()
    }

    pub fn set_raster_transparency(&mut self, transparency: Option<RasterTransparency>) {
        self.transparency = transparency;
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<()> {
        check_opacity(opacity)?;
        self.opacity = opacity;
        Ok(())
    }
}

impl RasterRenderer for SingleBandGrayRenderer {
    fn render(&self, source: &dyn SampleSource) -> Result<RgbaImage> {
        let block = source.block(self.band)?;
        let global_alpha = (self.opacity * 255.0).round() as u8;

        Ok(render_pixels(block, |v| match self.contrast.enhance(v) {
            None => [0, 0, 0, 0],
            Some(gray) => {
                let alpha = match &self.transparency {
                    Some(t) => t.alpha_value(v, global_alpha),
                    None => global_alpha,
                };
                premultiplied(Rgba::rgb(gray, gray, gray), alpha)
            }
        }))
    }

    fn uses_bands(&self) -> Vec<usize> {
        vec![self.band]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contrast::ContrastAlgorithm;
    use crate::transparency::TransparentValueRange;
    use gridshade_colormap::{ColorRampItem, RampType};
    use gridshade_core::MemoryRaster;

    fn ramp_shader() -> ColorRampShader {
        let mut shader = ColorRampShader::new();
        shader.set_ramp_type(RampType::Interpolated);
        shader
            .set_items(vec![
                ColorRampItem::new(0.0, Rgba::rgb(0, 0, 0), "low"),
                ColorRampItem::new(100.0, Rgba::rgb(255, 255, 255), "high"),
            ])
            .unwrap();
        shader
    }

    #[test]
    fn band_zero_is_rejected() {
        assert!(SingleBandPseudoColorRenderer::new(0, ramp_shader()).is_err());
    }

    #[test]
    fn pseudo_color_renders_ramp() {
        let mut block = BandBlock::from_vec(vec![0.0, 50.0, 100.0, f64::NAN], 2, 2).unwrap();
        block.set_nodata(Some(f64::NAN));
        let source = MemoryRaster::single(block);

        let renderer = SingleBandPseudoColorRenderer::new(1, ramp_shader()).unwrap();
        let image = renderer.render(&source).unwrap();

        assert_eq!(image.data().len(), 16);
        assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
        assert_eq!(image.pixel(0, 1).unwrap(), [128, 128, 128, 255]);
        assert_eq!(image.pixel(1, 0).unwrap(), [255, 255, 255, 255]);
        // nodata -> transparent
        assert_eq!(image.pixel(1, 1).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn shader_miss_is_transparent() {
        let mut shader = ramp_shader();
        shader.set_ramp_type(RampType::Exact);
        let block = BandBlock::from_vec(vec![42.0], 1, 1).unwrap();
        let renderer = SingleBandPseudoColorRenderer::new(1, shader).unwrap();
        let image = renderer.render(&MemoryRaster::single(block)).unwrap();
        assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn transparency_modulates_alpha_premultiplied() {
        let block = BandBlock::from_vec(vec![100.0], 1, 1).unwrap();
        let mut renderer = SingleBandPseudoColorRenderer::new(1, ramp_shader()).unwrap();
        let mut transparency = RasterTransparency::new();
        transparency.set_ranges(vec![
            TransparentValueRange::new(90.0, 110.0, 50.0).unwrap(),
        ]);
        renderer.set_raster_transparency(Some(transparency));

        let image = renderer.render(&MemoryRaster::single(block)).unwrap();
        // white at 50% transparency, premultiplied
        assert_eq!(image.pixel(0, 0).unwrap(), [128, 128, 128, 128]);
    }

    #[test]
    fn global_opacity_applies_without_transparency() {
        let block = BandBlock::from_vec(vec![100.0], 1, 1).unwrap();
        let mut renderer = SingleBandPseudoColorRenderer::new(1, ramp_shader()).unwrap();
        renderer.set_opacity(0.5).unwrap();
        let image = renderer.render(&MemoryRaster::single(block)).unwrap();
        assert_eq!(image.pixel(0, 0).unwrap(), [128, 128, 128, 128]);
    }

    #[test]
    fn gray_renderer_stretches_and_clips() {
        let ce =
            ContrastEnhancement::new(ContrastAlgorithm::StretchAndClipToMinMax, 0.0, 100.0)
                .unwrap();
        let block = BandBlock::from_vec(vec![0.0, 100.0, 150.0], 1, 3).unwrap();
        let renderer = SingleBandGrayRenderer::new(1, ce).unwrap();
        let image = renderer.render(&MemoryRaster::single(block)).unwrap();

        assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
        assert_eq!(image.pixel(0, 1).unwrap(), [255, 255, 255, 255]);
        // clipped value draws nothing
        assert_eq!(image.pixel(0, 2).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn uses_bands_reports_configured_band() {
        let renderer = SingleBandPseudoColorRenderer::new(3, ramp_shader()).unwrap();
        assert_eq!(renderer.uses_bands(), vec![3]);
    }
}
