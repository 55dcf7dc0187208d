//! Error types for raster loading and classification.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Failed to read raster file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to decode TIFF data: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    #[error("Unsupported pixel format in {path}")]
    UnsupportedPixelFormat { path: PathBuf },

    #[error("Raster {path} has {actual} samples, expected {expected}")]
    ShapeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, RasterError>;
