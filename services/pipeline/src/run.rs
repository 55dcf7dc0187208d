//! One end-to-end run: classify, render, organize, compose, publish.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use rayon::prelude::*;
use tracing::{info, warn};

use compositor::{
    collect_templates, display_key, organize, CompositeTemplate, LayoutCompositor, OrganizedImage,
};
use palette::{tables::PARAMETERS, PaletteTable, PaletteVariant};
use publisher::{PublishConfig, Publisher};
use raster::{classify, needs_classification, GridView, RasterAsset};
use renderer::OverlaySet;

use crate::config::PipelineConfig;
use crate::summary::RunSummary;

const VARIANTS: [PaletteVariant; 2] = [PaletteVariant::Primary, PaletteVariant::Reduced];

/// Execute a full run. On any unexpected error the working tree is
/// removed best-effort before the error propagates.
pub async fn run(
    config: &PipelineConfig,
    username: &str,
    password: &str,
    skip_publish: bool,
) -> anyhow::Result<RunSummary> {
    let result = run_inner(config, username, password, skip_publish).await;
    if result.is_err() {
        if let Err(e) = fs::remove_dir_all(&config.work_dir) {
            warn!(
                work_dir = %config.work_dir.display(),
                error = %e,
                "Failed to clean working tree after error"
            );
        }
    }
    result
}

async fn run_inner(
    config: &PipelineConfig,
    username: &str,
    password: &str,
    skip_publish: bool,
) -> anyhow::Result<RunSummary> {
    if !config.raster_dir.is_dir() {
        bail!("Raster directory not found: {}", config.raster_dir.display());
    }
    if !config.template_dir.is_dir() {
        bail!(
            "Template directory not found: {}",
            config.template_dir.display()
        );
    }
    if !config.font_path.is_file() {
        bail!("Label font not found: {}", config.font_path.display());
    }

    let tree = WorkTree::recreate(&config.work_dir)?;

    let overlays = OverlaySet::from_geojson_files(
        &config.overlays.sea,
        &config.overlays.countries,
        &config.overlays.central_countries,
    )
    .context("Failed to load overlay geometry")?;

    let layout =
        LayoutCompositor::new(&config.font_path).context("Failed to load label font")?;

    let mut summary = RunSummary::default();

    let paths = scan_rasters(&config.raster_dir, &mut summary)?;
    let assets = load_rasters(&paths, &mut summary);
    summary.rasters_processed = assets.len();
    info!(count = assets.len(), "Loaded input rasters");

    // Sequential render pass, one grouped image set per variant.
    let mut series: HashMap<(PaletteVariant, String), Vec<OrganizedImage>> = HashMap::new();
    for variant in VARIANTS {
        let table = PaletteTable::for_variant(variant);
        let groups = render_variant(&assets, &table, &overlays, &tree, &mut summary)?;
        summary.groups += groups.len();

        for (key, images) in groups.iter() {
            let dest = tree.series.join(variant.as_str()).join(key);
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;
            let organized = organize(key, images, &dest)
                .with_context(|| format!("Failed to organize series {key}"))?;
            series.insert((variant, key.to_string()), organized);
        }
    }

    let templates =
        collect_templates(&config.template_dir).context("Failed to scan templates")?;
    let units = match_templates(&templates, &series, &mut summary);

    // Each unit touches disjoint files, so composition parallelizes
    // cleanly across templates.
    units
        .par_iter()
        .map(|(template, key, organized)| compose_one(&layout, template, key, organized, &tree))
        .collect::<anyhow::Result<Vec<()>>>()?;
    summary.templates_matched = units.len();

    if skip_publish {
        info!("Publishing disabled for this run");
    } else {
        let mut publish = PublishConfig::new(&config.publish.base_url, username, password);
        publish.max_concurrent = config.publish.max_concurrent;
        publish.accept_invalid_certs = config.publish.accept_invalid_certs;

        let report = Publisher::new(publish)
            .context("Failed to build publish client")?
            .publish_tree(&tree.output)
            .await
            .context("Publish run failed")?;
        summary.files_published = report.succeeded();
        summary.publish_failures = report.failed();
    }

    summary.log_report();
    Ok(summary)
}

/// Fixed layout of the per-run working tree. Only `output` is
/// published; maps and series hold intermediates.
struct WorkTree {
    maps: PathBuf,
    series: PathBuf,
    output: PathBuf,
}

impl WorkTree {
    /// Drop any stale tree from a previous run and start fresh.
    fn recreate(work_dir: &Path) -> anyhow::Result<Self> {
        if work_dir.exists() {
            fs::remove_dir_all(work_dir)
                .with_context(|| format!("Failed to clear {}", work_dir.display()))?;
        }
        let tree = Self {
            maps: work_dir.join("maps"),
            series: work_dir.join("series"),
            output: work_dir.join("output"),
        };
        for variant in VARIANTS {
            fs::create_dir_all(tree.maps.join(variant.as_str()))?;
            fs::create_dir_all(tree.series.join(variant.as_str()))?;
        }
        fs::create_dir_all(&tree.output)?;
        Ok(tree)
    }
}

/// Whether a file stem names a known indicator series.
fn known_parameter(stem: &str) -> bool {
    PARAMETERS.iter().any(|p| stem.contains(p))
}

/// Collect `.tif` inputs whose names carry a known parameter token.
fn scan_rasters(raster_dir: &Path, summary: &mut RunSummary) -> anyhow::Result<Vec<PathBuf>> {
    let mut rasters = Vec::new();
    for entry in walkdir::WalkDir::new(raster_dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk raster directory")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let is_tif = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"));
        if !is_tif {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if known_parameter(stem) {
            rasters.push(path);
        } else {
            warn!(path = %path.display(), "Skipping raster with unknown parameter");
            summary.rasters_skipped += 1;
        }
    }
    Ok(rasters)
}

/// Read every scanned raster once, before the per-variant render
/// loops, so an unreadable file is counted as a single skip.
fn load_rasters(paths: &[PathBuf], summary: &mut RunSummary) -> Vec<RasterAsset> {
    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        match raster::open(path) {
            Ok(asset) => assets.push(asset),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable raster");
                summary.rasters_skipped += 1;
            }
        }
    }
    assets
}

/// Classify and render every raster through one palette registry,
/// accumulating the rendered maps per background group.
fn render_variant(
    assets: &[RasterAsset],
    table: &PaletteTable,
    overlays: &OverlaySet,
    tree: &WorkTree,
    summary: &mut RunSummary,
) -> anyhow::Result<compositor::BackgroundGroups> {
    let variant_dir = tree.maps.join(table.variant().as_str());
    let mut groups = compositor::BackgroundGroups::new();

    for asset in assets {
        let name = compositor::RasterName::parse(asset.stem());

        // An unknown indicator here means the registry and the input
        // feed disagree, which only configuration can fix.
        let palette = table
            .get(&name.indicator)
            .with_context(|| format!("No palette for raster {}", asset.path.display()))?;

        let image = if needs_classification(table, &name.indicator) {
            let classified = classify(asset, raster::boundaries_of(palette));
            renderer::render(&GridView::Classified(&classified), palette, overlays)
        } else {
            renderer::render(&GridView::Raw(asset), palette, overlays)
        }
        .with_context(|| format!("Failed to render {}", asset.path.display()))?;
        let rendered = renderer::VisualizationImage {
            image,
            indicator: name.indicator.clone(),
            date: name.date_token().to_string(),
        };

        let out = variant_dir.join(format!("{}.png", asset.stem()));
        rendered
            .save_png(&out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        summary.images_rendered += 1;

        groups.insert(name.group_key(), out);
    }
    Ok(groups)
}

/// Pair every template with its organized series for the variant its
/// subtree selects. Unmatched templates are skipped with a warning.
fn match_templates<'a>(
    templates: &'a [CompositeTemplate],
    series: &'a HashMap<(PaletteVariant, String), Vec<OrganizedImage>>,
    summary: &mut RunSummary,
) -> Vec<(&'a CompositeTemplate, &'a str, &'a [OrganizedImage])> {
    let mut units = Vec::new();
    for template in templates {
        let Some(key) = template.group_key.as_deref() else {
            warn!(path = %template.path.display(), "Template name carries no group key, skipping");
            summary.templates_skipped += 1;
            continue;
        };
        match series.get(&(template.variant(), key.to_string())) {
            Some(organized) => units.push((template, key, organized.as_slice())),
            None => {
                warn!(
                    path = %template.path.display(),
                    key,
                    "No rendered series for template, skipping"
                );
                summary.templates_skipped += 1;
            }
        }
    }
    units
}

/// Compose one template into its mirrored output directory. The
/// directory receives the composite named after the group's display
/// key, a copy of every organized series image, and a JPEG of the
/// composite one level up under `JPG/`.
fn compose_one(
    layout: &LayoutCompositor,
    template: &CompositeTemplate,
    key: &str,
    organized: &[OrganizedImage],
    tree: &WorkTree,
) -> anyhow::Result<()> {
    let images: Vec<&Path> = organized.iter().map(|o| o.path.as_path()).collect();
    let labels: Vec<String> = organized.iter().map(|o| o.label.clone()).collect();

    let canvas = layout
        .compose(&template.path, &images, &labels)
        .with_context(|| format!("Failed to compose {}", template.path.display()))?;

    let out_dir = tree.output.join(&template.relative_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    // The series images ship alongside the composite.
    for image in organized {
        let Some(file_name) = image.path.file_name() else {
            continue;
        };
        fs::copy(&image.path, out_dir.join(file_name))
            .with_context(|| format!("Failed to copy {}", image.path.display()))?;
    }

    let name = display_key(key);
    compositor::save_png(&canvas, &out_dir.join(format!("{name}.png")))
        .with_context(|| format!("Failed to write composite {name}"))?;

    let jpg_dir = tree
        .output
        .join(template.relative_dir.parent().unwrap_or_else(|| Path::new("")))
        .join("JPG");
    fs::create_dir_all(&jpg_dir)
        .with_context(|| format!("Failed to create {}", jpg_dir.display()))?;
    compositor::save_jpeg(&canvas, &jpg_dir.join(format!("{name}.jpg")))
        .with_context(|| format!("Failed to write JPEG copy {name}"))?;

    info!(template = %template.path.display(), maps = organized.len(), "Composed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{write_gray_tiff, write_png};

    fn system_font() -> Option<PathBuf> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/Library/Fonts/Arial Unicode.ttf",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }

    #[test]
    fn parameter_filter_accepts_known_series() {
        assert!(known_parameter("CZ_AWP_0-40_2024-05-01"));
        assert!(known_parameter("FWI_GenZ_2024-05-01"));
        assert!(known_parameter("UTCI_2024-05-01"));
        assert!(!known_parameter("SWE_2024-05-01"));
        assert!(!known_parameter("readme"));
    }

    #[test]
    fn work_tree_recreation_clears_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        fs::create_dir_all(work.join("output")).unwrap();
        fs::write(work.join("output/stale.png"), b"old").unwrap();

        let tree = WorkTree::recreate(&work).unwrap();
        assert!(tree.output.is_dir());
        assert!(!tree.output.join("stale.png").exists());
        assert!(tree.maps.join("primary").is_dir());
        assert!(tree.series.join("reduced").is_dir());
    }

    #[test]
    fn unreadable_raster_counts_one_skip_across_variants() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("AWP_0-40_2024-05-01.tif"), b"not a tiff").unwrap();
        let tree = WorkTree::recreate(&dir.path().join("work")).unwrap();

        let mut summary = RunSummary::default();
        let paths = scan_rasters(dir.path(), &mut summary).unwrap();
        assert_eq!(paths.len(), 1);
        let assets = load_rasters(&paths, &mut summary);
        assert!(assets.is_empty());

        for variant in VARIANTS {
            let table = PaletteTable::for_variant(variant);
            render_variant(&assets, &table, &OverlaySet::empty(), &tree, &mut summary).unwrap();
        }
        assert_eq!(summary.rasters_skipped, 1);
        assert_eq!(summary.images_rendered, 0);
    }

    #[test]
    fn composite_output_mirrors_the_upload_layout() {
        let Some(font) = system_font() else {
            eprintln!("skipping: no system font available");
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let tree = WorkTree::recreate(&dir.path().join("work")).unwrap();

        let template_path = dir.path().join("CZ_UTCI.png");
        write_png(&template_path, 1000, 1100, [240, 240, 240, 255]);
        let map = dir.path().join("UTCI_0.png");
        write_png(&map, 10, 10, [0, 100, 0, 255]);

        let template = CompositeTemplate {
            path: template_path,
            relative_dir: PathBuf::from("downloads/normal/CZ"),
            group_key: Some("UTCI".to_string()),
        };
        let organized = vec![OrganizedImage {
            path: map,
            label: "01.05.2024".to_string(),
            index: 0,
            date: None,
        }];

        let layout = LayoutCompositor::new(&font).unwrap();
        compose_one(&layout, &template, "UTCI", &organized, &tree).unwrap();

        let out_dir = tree.output.join("downloads/normal/CZ");
        assert!(out_dir.join("UTCI.png").is_file(), "composite by display key");
        assert!(out_dir.join("UTCI_0.png").is_file(), "series image ships too");
        assert!(
            tree.output.join("downloads/normal/JPG/UTCI.jpg").is_file(),
            "JPEG copy sits one level up"
        );
    }

    #[test]
    fn rerunning_identical_inputs_is_deterministic() {
        fn render_and_organize(input: &Path, work: &Path) -> (Vec<String>, usize) {
            let tree = WorkTree::recreate(work).unwrap();
            let mut summary = RunSummary::default();
            let paths = scan_rasters(input, &mut summary).unwrap();
            let assets = load_rasters(&paths, &mut summary);

            let mut keys = Vec::new();
            for variant in VARIANTS {
                let table = PaletteTable::for_variant(variant);
                let groups =
                    render_variant(&assets, &table, &OverlaySet::empty(), &tree, &mut summary)
                        .unwrap();
                for (key, images) in groups.iter() {
                    keys.push(format!("{}/{}", variant.as_str(), key));
                    let dest = tree.series.join(variant.as_str()).join(key);
                    fs::create_dir_all(&dest).unwrap();
                    organize(key, images, &dest).unwrap();
                }
            }

            let files = walkdir::WalkDir::new(work)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .count();
            (keys, files)
        }

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir_all(&input).unwrap();
        for stem in ["AWD_0-40_2024-05-01", "AWD_0-40_2024-05-02", "UTCI_2024-05-01"] {
            let data = vec![-999.0, 5.0, 15.0, 25.0];
            write_gray_tiff(&input.join(format!("{stem}.tif")), 4, 1, &data);
        }

        let first = render_and_organize(&input, &dir.path().join("work_a"));
        let second = render_and_organize(&input, &dir.path().join("work_b"));
        assert_eq!(first.0, second.0, "group membership is stable");
        assert_eq!(first.1, second.1, "file counts are stable");
        assert!(first.1 > 0);
    }
}
