//! YAML run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

fn default_max_concurrent() -> usize {
    publisher::DEFAULT_MAX_CONCURRENT
}

/// GeoJSON files drawn over every rendered map.
#[derive(Debug, Clone, Deserialize)]
pub struct OverlayPaths {
    pub sea: PathBuf,
    pub countries: PathBuf,
    pub central_countries: PathBuf,
}

/// Remote endpoint the finished tree is pushed to. Credentials come
/// from the environment, not from this file.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishEndpoint {
    pub base_url: String,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Input GeoTIFF rasters.
    pub raster_dir: PathBuf,
    /// Background canvas PNGs, scanned recursively.
    pub template_dir: PathBuf,
    /// Per-run working tree, recreated on every start.
    pub work_dir: PathBuf,
    /// TrueType font for date labels.
    pub font_path: PathBuf,
    pub overlays: OverlayPaths,
    pub publish: PublishEndpoint,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: PipelineConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
raster_dir: /data/rasters
template_dir: /data/templates
work_dir: /tmp/pipeline-work
font_path: /usr/share/fonts/truetype/dejavu/DejaVuSans.ttf
overlays:
  sea: /data/overlays/sea.geojson
  countries: /data/overlays/countries.geojson
  central_countries: /data/overlays/central.geojson
publish:
  base_url: https://maps.example.org/api
"#;

    #[test]
    fn parses_sample_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.raster_dir, PathBuf::from("/data/rasters"));
        assert_eq!(config.publish.base_url, "https://maps.example.org/api");
        assert_eq!(config.publish.max_concurrent, 10);
        assert!(!config.publish.accept_invalid_certs);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(PipelineConfig::load(Path::new("/nonexistent.yaml")).is_err());
    }
}
