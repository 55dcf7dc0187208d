//! GeoTIFF reading for single-band indicator rasters.
//!
//! Upstream clipping and reprojection already happened by the time a
//! file reaches this pipeline, so reading stays deliberately small:
//! one band, whole image, plus the georeference and no-data tags when
//! present.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::warn;

use crate::error::{RasterError, Result};
use crate::grid::{GeoTransform, RasterAsset};

/// GeoTIFF ModelPixelScaleTag.
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
/// GeoTIFF ModelTiepointTag.
const TAG_MODEL_TIEPOINT: u16 = 33922;
/// GDAL_NODATA ASCII tag.
const TAG_GDAL_NODATA: u16 = 42113;

/// Read a single-band GeoTIFF into memory.
pub fn read_geotiff(path: &Path) -> Result<RasterAsset> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let transform = read_transform(&mut decoder).unwrap_or_else(|| {
        warn!(path = %path.display(), "No georeference tags, assuming pixel space");
        GeoTransform::pixel_space()
    });
    let nodata = read_nodata(&mut decoder);

    let data = match decoder.read_image()? {
        DecodingResult::U8(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        _ => {
            return Err(RasterError::UnsupportedPixelFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if data.len() != width * height {
        return Err(RasterError::ShapeMismatch {
            path: path.to_path_buf(),
            expected: width * height,
            actual: data.len(),
        });
    }

    Ok(RasterAsset {
        path: path.to_path_buf(),
        width,
        height,
        data,
        transform,
        nodata,
    })
}

fn read_transform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(TAG_MODEL_PIXEL_SCALE))
        .ok()?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::Unknown(TAG_MODEL_TIEPOINT))
        .ok()?;
    if scale.len() < 2 || tiepoint.len() < 5 {
        return None;
    }
    // Tiepoint maps raster (i, j) to world (x, y); production rasters
    // anchor at the top-left corner (0, 0).
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Some(GeoTransform {
        origin_x: x - i * scale[0],
        origin_y: y + j * scale[1],
        pixel_width: scale[0],
        pixel_height: -scale[1],
    })
}

fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder
        .get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA))
        .ok()?;
    match text.trim().trim_end_matches('\0').parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(tag = %text, "Unparseable GDAL_NODATA tag, falling back to default");
            None
        }
    }
}
