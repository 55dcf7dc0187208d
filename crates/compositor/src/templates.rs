//! Template discovery.
//!
//! Templates are background canvas PNGs organized in a directory tree.
//! A template's relative directory mirrors into the output tree and
//! selects the palette variant; its stem (minus the fixed region
//! prefix) selects the background group it composes.

use std::path::{Path, PathBuf};

use palette::PaletteVariant;
use walkdir::WalkDir;

use crate::error::Result;
use crate::groups::template_key;

/// One background canvas found under the template root.
#[derive(Debug, Clone)]
pub struct CompositeTemplate {
    pub path: PathBuf,
    /// Directory of the template relative to the template root.
    pub relative_dir: PathBuf,
    /// Background group key the template's stem resolves to, when the
    /// stem is long enough to carry one.
    pub group_key: Option<String>,
}

impl CompositeTemplate {
    /// Palette variant selected by the template's subtree: a path
    /// component named `reduced` selects the reduced registry.
    pub fn variant(&self) -> PaletteVariant {
        let reduced = self
            .relative_dir
            .components()
            .any(|c| c.as_os_str() == PaletteVariant::REDUCED_SUBTREE);
        if reduced {
            PaletteVariant::Reduced
        } else {
            PaletteVariant::Primary
        }
    }
}

/// Scan the template root for background canvases.
pub fn collect_templates(template_root: &Path) -> Result<Vec<CompositeTemplate>> {
    let mut templates = Vec::new();
    for entry in WalkDir::new(template_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        let relative_dir = path
            .parent()
            .and_then(|p| p.strip_prefix(template_root).ok())
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        templates.push(CompositeTemplate {
            path: path.to_path_buf(),
            relative_dir,
            group_key: template_key(stem),
        });
    }
    Ok(templates)
}
