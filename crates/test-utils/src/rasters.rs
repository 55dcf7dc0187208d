//! Synthetic raster and image fixtures.

use std::fs::File;
use std::path::Path;

use image::{Rgba, RgbaImage};
use tiff::encoder::{colortype, TiffEncoder};

/// Write a single-band 32-bit float TIFF. Geo tags are deliberately
/// omitted; readers fall back to pixel-space georeference, which is
/// what grid-level tests want.
pub fn write_gray_tiff(path: &Path, width: u32, height: u32, data: &[f32]) {
    assert_eq!(data.len(), (width * height) as usize, "fixture shape mismatch");
    let file = File::create(path).expect("create fixture tiff");
    let mut encoder = TiffEncoder::new(file).expect("tiff encoder");
    encoder
        .write_image::<colortype::Gray32Float>(width, height, data)
        .expect("write fixture tiff");
}

/// A gradient raster covering `min..=max` left to right, with the top
/// row forced to the −999 no-data sentinel.
pub fn gradient_with_nodata(width: u32, height: u32, min: f32, max: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity((width * height) as usize);
    for row in 0..height {
        for col in 0..width {
            if row == 0 {
                data.push(-999.0);
            } else {
                let t = col as f32 / (width.saturating_sub(1).max(1)) as f32;
                data.push(min + (max - min) * t);
            }
        }
    }
    data
}

/// Write a flat-color RGBA PNG, used as a map or template stand-in.
pub fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    image.save(path).expect("write fixture png");
}
