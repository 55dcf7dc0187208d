//! Map rendering for classified climate indicator rasters.
//!
//! Turns a raw or classified grid into an RGBA map image: palette
//! colors per cell, full transparency for no-data cells, and the fixed
//! sea/country boundary overlays on top. The canvas extent comes from
//! the raster's affine transform (one pixel per cell), never from the
//! overlay geometry.

pub mod colormap;
mod error;
pub mod overlay;

pub use colormap::{ColorScale, ContinuousScale, DiscreteScale};
pub use error::{RenderError, Result};
pub use overlay::{draw_overlays, OverlaySet, Ring};

use std::path::Path;

use image::{Rgba, RgbaImage};
use palette::Palette;
use raster::GridView;
use tracing::debug;

/// Reserved sentinel that continuous palettes treat as no-data in
/// addition to the grid's own sentinel.
const CONTINUOUS_NODATA: f64 = -1.0;

/// A rendered map together with its originating identity.
#[derive(Debug, Clone)]
pub struct VisualizationImage {
    pub image: RgbaImage,
    pub indicator: String,
    pub date: String,
}

impl VisualizationImage {
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

/// Render a grid through a palette with boundary overlays.
///
/// No-data cells (the grid's sentinel, −999, and additionally −1 for
/// continuous palettes) become fully transparent regardless of the
/// coloring mode.
pub fn render(grid: &GridView, palette: &Palette, overlays: &OverlaySet) -> Result<RgbaImage> {
    let (width, height) = grid.dimensions();
    let scale = ColorScale::from_palette(palette)?;

    let mut canvas = RgbaImage::new(width as u32, height as u32);
    for row in 0..height {
        for col in 0..width {
            let value = grid.value_at(col, row);
            let masked = grid.is_nodata_at(col, row)
                || (palette.continuous && value == CONTINUOUS_NODATA);
            let pixel = if masked {
                Rgba([0, 0, 0, 0])
            } else {
                let c = scale.color_for(value);
                Rgba([c.r, c.g, c.b, 255])
            };
            canvas.put_pixel(col as u32, row as u32, pixel);
        }
    }

    draw_overlays(&mut canvas, overlays, &grid.transform());
    debug!(width, height, continuous = palette.continuous, "Rendered map image");
    Ok(canvas)
}
