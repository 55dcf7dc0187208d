//! Shared test fixtures for the clim-maps workspace.
//!
//! Provides synthetic raster files, template canvases and directory
//! scaffolding so crate tests never depend on real production data.
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod rasters;
pub mod trees;

pub use rasters::*;
pub use trees::*;
