//! In-memory raster grid types.

use std::path::{Path, PathBuf};

/// Value used for cells without a measurement when the file does not
/// declare its own sentinel.
pub const DEFAULT_NODATA: f64 = -999.0;

/// Affine georeference of a north-up grid: world coordinates of the
/// top-left corner plus signed pixel sizes (`pixel_height` is negative
/// for the usual row-down orientation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Identity transform for rasters without georeference tags; world
    /// coordinates then equal pixel coordinates.
    pub fn pixel_space() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        }
    }

    /// World bounds of a `width` x `height` grid as
    /// `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let x0 = self.origin_x;
        let x1 = self.origin_x + self.pixel_width * width as f64;
        let y0 = self.origin_y;
        let y1 = self.origin_y + self.pixel_height * height as f64;
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// Map a world coordinate to fractional pixel coordinates.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }
}

/// A single-band numeric grid as read from disk, together with its
/// georeference and no-data sentinel. Read once, never mutated.
#[derive(Debug, Clone)]
pub struct RasterAsset {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
    pub transform: GeoTransform,
    pub nodata: Option<f64>,
}

impl RasterAsset {
    /// File stem, carrying the `{indicator}..._{date}` identity.
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// The declared no-data sentinel, defaulting to −999.
    pub fn nodata_value(&self) -> f64 {
        self.nodata.unwrap_or(DEFAULT_NODATA)
    }

    /// Whether a cell value marks a missing measurement. Both the
    /// declared sentinel and the reserved −999 count.
    pub fn is_nodata(&self, value: f32) -> bool {
        let v = value as f64;
        v == DEFAULT_NODATA || v == self.nodata_value()
    }

    pub fn value_at(&self, col: usize, row: usize) -> f32 {
        self.data[row * self.width + col]
    }
}

/// Classification output: same grid shape, values replaced by `i16`
/// class codes with no-data sentinels passed through. Transient,
/// discarded after rendering.
#[derive(Debug, Clone)]
pub struct ClassifiedRaster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<i16>,
    pub transform: GeoTransform,
    pub nodata: i16,
}

impl ClassifiedRaster {
    pub fn value_at(&self, col: usize, row: usize) -> i16 {
        self.data[row * self.width + col]
    }

    pub fn is_nodata(&self, value: i16) -> bool {
        value == self.nodata || value == DEFAULT_NODATA as i16
    }
}

/// Borrowed view over either a raw or a classified grid, letting the
/// renderer treat both uniformly.
pub enum GridView<'a> {
    Raw(&'a RasterAsset),
    Classified(&'a ClassifiedRaster),
}

impl GridView<'_> {
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            GridView::Raw(r) => (r.width, r.height),
            GridView::Classified(c) => (c.width, c.height),
        }
    }

    pub fn transform(&self) -> GeoTransform {
        match self {
            GridView::Raw(r) => r.transform,
            GridView::Classified(c) => c.transform,
        }
    }

    pub fn value_at(&self, col: usize, row: usize) -> f64 {
        match self {
            GridView::Raw(r) => r.value_at(col, row) as f64,
            GridView::Classified(c) => c.value_at(col, row) as f64,
        }
    }

    pub fn is_nodata_at(&self, col: usize, row: usize) -> bool {
        match self {
            GridView::Raw(r) => r.is_nodata(r.value_at(col, row)),
            GridView::Classified(c) => c.is_nodata(c.value_at(col, row)),
        }
    }
}

/// Convenience constructor for tests and synthetic data.
pub fn asset_from_values(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    data: Vec<f32>,
    nodata: Option<f64>,
) -> RasterAsset {
    debug_assert_eq!(data.len(), width * height);
    RasterAsset {
        path: path.as_ref().to_path_buf(),
        width,
        height,
        data,
        transform: GeoTransform::pixel_space(),
        nodata,
    }
}
