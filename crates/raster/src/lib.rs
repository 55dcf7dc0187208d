//! Raster model and classification for climate indicator grids.
//!
//! A [`RasterAsset`] is a single-band `f32` grid with an affine
//! georeference and an optional no-data sentinel, read from GeoTIFF.
//! [`classify`] turns raw values into the transient integer class grid
//! consumed by the renderer.

mod classify;
mod error;
mod geotiff;
mod grid;

pub use classify::{boundaries_of, classify, needs_classification};
pub use error::{RasterError, Result};
pub use grid::{
    asset_from_values, ClassifiedRaster, GeoTransform, GridView, RasterAsset, DEFAULT_NODATA,
};

use std::path::Path;

/// Open a single-band GeoTIFF raster.
pub fn open(path: impl AsRef<Path>) -> Result<RasterAsset> {
    geotiff::read_geotiff(path.as_ref())
}
