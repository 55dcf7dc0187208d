//! Grid compositing of a dated image series onto a template canvas.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use tracing::debug;

use crate::error::{ComposeError, Result};

// Layout geometry of the production templates, in pixels.
const START_X: i64 = 24;
const START_Y: i64 = 94;
const MAP_WIDTH: u32 = 850;
const MAP_HEIGHT: u32 = 906;
const STEP_X: i64 = MAP_WIDTH as i64 + 18;
const STEP_Y: i64 = MAP_HEIGHT as i64 + 122;
/// Maps per row, left to right.
const MAPS_PER_ROW: usize = 5;
const LABEL_DX: i64 = 42;
const LABEL_DY: i64 = -79;
const LABEL_SIZE: f32 = 62.0;
const LABEL_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// JPEG quality for the compressed copies of composites.
const JPEG_QUALITY: u8 = 50;

/// Pixel position of a series slot: five maps per row, rows growing
/// downward without bound.
pub fn slot_position(index: usize) -> (i64, i64) {
    let row = (index / MAPS_PER_ROW) as i64;
    let col = (index % MAPS_PER_ROW) as i64;
    (START_X + col * STEP_X, START_Y + row * STEP_Y)
}

/// Composites image series onto template canvases with date labels.
pub struct LayoutCompositor {
    font: Font<'static>,
}

impl LayoutCompositor {
    /// Load the label font from a TrueType file.
    pub fn new(font_path: &Path) -> Result<Self> {
        let bytes = std::fs::read(font_path)?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| ComposeError::FontLoad {
            path: font_path.to_path_buf(),
        })?;
        Ok(Self { font })
    }

    /// Paste the ordered series onto the template and draw one date
    /// label above each map. `images` and `labels` must be
    /// index-aligned.
    pub fn compose(
        &self,
        template_path: &Path,
        images: &[impl AsRef<Path>],
        labels: &[String],
    ) -> Result<RgbaImage> {
        if images.len() != labels.len() {
            return Err(ComposeError::LabelMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }

        let mut canvas = image::open(template_path)?.to_rgba8();
        let scale = Scale::uniform(LABEL_SIZE);

        for (index, (map_path, label)) in images.iter().zip(labels).enumerate() {
            let (x, y) = slot_position(index);

            // Hard resize to the cell, aspect ratio not preserved.
            let map = image::open(map_path.as_ref())?.to_rgba8();
            let map = imageops::resize(&map, MAP_WIDTH, MAP_HEIGHT, FilterType::Triangle);
            imageops::overlay(&mut canvas, &map, x, y);

            draw_text_mut(
                &mut canvas,
                LABEL_COLOR,
                (x + LABEL_DX) as i32,
                (y + LABEL_DY) as i32,
                scale,
                &self.font,
                label,
            );
        }

        debug!(
            template = %template_path.display(),
            maps = images.len(),
            "Composed layout"
        );
        Ok(canvas)
    }
}

/// Write the composite as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save(path)?;
    Ok(())
}

/// Write a compressed opaque-RGB JPEG copy of the composite.
pub fn save_jpeg(image: &RgbaImage, path: &Path) -> Result<()> {
    let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let file = File::create(path)?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
    encoder.encode_image(&rgb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_fill_rows_of_five() {
        assert_eq!(slot_position(0), (START_X, START_Y));
        assert_eq!(slot_position(4), (START_X + 4 * STEP_X, START_Y));
        // Slot 5 wraps to row 1, column 0.
        assert_eq!(slot_position(5), (START_X, START_Y + STEP_Y));
        assert_eq!(slot_position(7), (START_X + 2 * STEP_X, START_Y + STEP_Y));
    }
}
