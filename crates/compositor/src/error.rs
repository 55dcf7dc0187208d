//! Error types for grouping and compositing.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to decode or encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to load font from {path}")]
    FontLoad { path: PathBuf },

    #[error("{images} images but {labels} date labels")]
    LabelMismatch { images: usize, labels: usize },

    #[error("Template scan failed: {0}")]
    TemplateScan(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, ComposeError>;
