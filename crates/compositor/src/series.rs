//! Ordering and renaming of a background group's image series.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;

use crate::error::Result;
use crate::groups::{display_key, RasterName};

/// Date format used for labels on the composite layout.
const LABEL_FORMAT: &str = "%d.%m.%Y";

/// One entry of an organized series: the renamed on-disk image plus
/// the label the compositor draws above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizedImage {
    pub path: PathBuf,
    pub label: String,
    pub index: usize,
    pub date: Option<NaiveDate>,
}

/// Sort a group's images by their embedded date and copy them into
/// `dest_dir` renamed to `{display_key}_{index}.png`, flattened to
/// opaque RGB. The sequence index encodes "nth map of the series";
/// labels keep the true dates in the same order.
///
/// Images whose trailing token does not parse as a date sort first and
/// keep the raw token as their label; this is logged, not an error.
pub fn organize(group_key: &str, images: &[PathBuf], dest_dir: &Path) -> Result<Vec<OrganizedImage>> {
    let mut dated: Vec<(Option<NaiveDate>, &PathBuf)> = images
        .iter()
        .map(|path| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let name = RasterName::parse(stem);
            let date = name.date();
            if date.is_none() {
                warn!(
                    group = group_key,
                    path = %path.display(),
                    token = name.date_token(),
                    "Unparseable date token, sorting first"
                );
            }
            (date, path)
        })
        .collect();

    // Stable sort: None (unparseable) precedes every real date.
    dated.sort_by_key(|(date, _)| *date);

    let name = display_key(group_key);
    let mut organized = Vec::with_capacity(dated.len());
    for (index, (date, source)) in dated.into_iter().enumerate() {
        let target = dest_dir.join(format!("{name}_{index}.png"));
        flatten_to_rgb(source, &target)?;

        let label = match date {
            Some(d) => d.format(LABEL_FORMAT).to_string(),
            None => {
                let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                RasterName::parse(stem).date_token().to_string()
            }
        };
        organized.push(OrganizedImage {
            path: target,
            label,
            index,
            date,
        });
    }
    Ok(organized)
}

/// Drop the alpha channel so output file sizes stay predictable.
fn flatten_to_rgb(source: &Path, target: &Path) -> Result<()> {
    let image = image::open(source)?;
    image.to_rgb8().save(target)?;
    Ok(())
}
