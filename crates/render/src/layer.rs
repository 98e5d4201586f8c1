//! The raster layer: owns a sample source and the active renderer, and
//! notifies observers when the renderer is replaced.

use tracing::debug;

use gridshade_core::{band_statistics, MinMaxOrigin, Result, SampleSource};

use crate::contrast::{ContrastAlgorithm, ContrastEnhancement};
use crate::renderer::{RasterRenderer, RgbaImage, SingleBandGrayRenderer};

/// Handle returned by [`RasterLayer::on_renderer_changed`], used to
/// unregister the observer again.
pub type ObserverId = usize;

type RendererChangedFn = Box<dyn Fn() + Send + Sync>;

/// A single raster layer: sample source plus the active renderer
/// configuration.
///
/// Replacing the renderer is an atomic swap: the previous renderer (and
/// everything it owns, shader stop lists included) is fully dropped before
/// observers run, so observers only ever see the new configuration.
pub struct RasterLayer {
    source: Box<dyn SampleSource>,
    renderer: Box<dyn RasterRenderer>,
    observers: Vec<(ObserverId, RendererChangedFn)>,
    next_observer: ObserverId,
}

impl RasterLayer {
    pub fn new(source: Box<dyn SampleSource>, renderer: Box<dyn RasterRenderer>) -> Self {
        Self {
            source,
            renderer,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    /// The active renderer
    pub fn renderer(&self) -> &dyn RasterRenderer {
        self.renderer.as_ref()
    }

    /// The sample source backing this layer
    pub fn source(&self) -> &dyn SampleSource {
        self.source.as_ref()
    }

    /// Replace the active renderer and notify observers.
    ///
    /// Observers run synchronously, strictly after the swap completes.
    pub fn set_renderer(&mut self, renderer: Box<dyn RasterRenderer>) {
        let old = std::mem::replace(&mut self.renderer, renderer);
        drop(old);
        debug!("renderer replaced");
        for (_, callback) in &self.observers {
            callback();
        }
    }

    /// Register a renderer-changed observer.
    pub fn on_renderer_changed(
        &mut self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> ObserverId {
        let id = self.next_observer;
        self.next_observer += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Unregister an observer. Returns whether it was registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Compute band 1 statistics per the origin policy and install a gray
    /// renderer stretching to those bounds.
    ///
    /// Notifies renderer-changed observers like any other replacement.
    pub fn set_contrast_enhancement(
        &mut self,
        algorithm: ContrastAlgorithm,
        origin: &MinMaxOrigin,
    ) -> Result<()> {
        let block = self.source.block(1)?;
        let stats = band_statistics(block, origin)?;
        let contrast = ContrastEnhancement::from_statistics(algorithm, &stats);
        debug!(
            minimum = contrast.minimum(),
            maximum = contrast.maximum(),
            "contrast enhancement installed"
        );
        let renderer = SingleBandGrayRenderer::new(1, contrast)?;
        self.set_renderer(Box::new(renderer));
        Ok(())
    }

    /// Render through the active renderer
    pub fn render(&self) -> Result<RgbaImage> {
        self.renderer.render(self.source.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::renderer::SingleBandPseudoColorRenderer;
    use gridshade_colormap::{ColorRampItem, ColorRampShader, Rgba};
    use gridshade_core::{BandBlock, Limits, MemoryRaster, StatAccuracy};

    fn test_layer() -> RasterLayer {
        let block = BandBlock::from_vec(vec![0.0, 50.0, 100.0, 25.0], 2, 2).unwrap();
        let shader = ColorRampShader::new();
        let renderer = SingleBandPseudoColorRenderer::new(1, shader).unwrap();
        RasterLayer::new(
            Box::new(MemoryRaster::single(block)),
            Box::new(renderer),
        )
    }

    #[test]
    fn renderer_changed_fires_after_swap() {
        let mut layer = test_layer();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_observer = Arc::clone(&fired);
        layer.on_renderer_changed(move || {
            fired_in_observer.fetch_add(1, Ordering::SeqCst);
        });

        let renderer = SingleBandPseudoColorRenderer::new(1, ColorRampShader::new()).unwrap();
        layer.set_renderer(Box::new(renderer));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_observer_no_longer_fires() {
        let mut layer = test_layer();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_observer = Arc::clone(&fired);
        let id = layer.on_renderer_changed(move || {
            fired_in_observer.fetch_add(1, Ordering::SeqCst);
        });

        assert!(layer.remove_observer(id));
        assert!(!layer.remove_observer(id));

        let renderer = SingleBandPseudoColorRenderer::new(1, ColorRampShader::new()).unwrap();
        layer.set_renderer(Box::new(renderer));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn contrast_enhancement_uses_band_statistics() {
        let mut layer = test_layer();
        let mut origin = MinMaxOrigin::default();
        origin.set_limits(Limits::MinMax);
        origin.set_stat_accuracy(StatAccuracy::Exact);

        layer
            .set_contrast_enhancement(ContrastAlgorithm::StretchToMinMax, &origin)
            .unwrap();

        // values 0..=100 stretch to the full display range
        let image = layer.render().unwrap();
        assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 0, 255]);
        assert_eq!(image.pixel(1, 0).unwrap(), [255, 255, 255, 255]);
    }

    #[test]
    fn second_renderer_configuration_takes_effect() {
        let mut layer = test_layer();

        let mut shader = ColorRampShader::new();
        shader
            .set_items(vec![ColorRampItem::new(0.0, Rgba::rgb(255, 0, 0), "red")])
            .unwrap();
        let renderer = SingleBandPseudoColorRenderer::new(1, shader).unwrap();
        layer.set_renderer(Box::new(renderer));

        let mut shader = ColorRampShader::new();
        shader
            .set_items(vec![ColorRampItem::new(0.0, Rgba::rgb(0, 0, 255), "blue")])
            .unwrap();
        let renderer = SingleBandPseudoColorRenderer::new(1, shader).unwrap();
        layer.set_renderer(Box::new(renderer));

        // single-stop interpolated ramp clamps everything to the stop color
        let image = layer.render().unwrap();
        assert_eq!(image.pixel(0, 0).unwrap(), [0, 0, 255, 255]);
        assert_eq!(image.pixel(1, 1).unwrap(), [0, 0, 255, 255]);
    }
}
