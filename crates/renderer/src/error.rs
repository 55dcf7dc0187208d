//! Error types for map rendering.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Palette has no colors")]
    EmptyPalette,

    #[error("Continuous palette has a degenerate value range or fewer than two colors")]
    DegenerateGradient,

    #[error("Failed to read overlay file: {0}")]
    OverlayRead(#[from] std::io::Error),

    #[error("Failed to parse overlay GeoJSON: {0}")]
    OverlayParse(#[from] serde_json::Error),

    #[error("Failed to encode image: {0}")]
    ImageEncode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
