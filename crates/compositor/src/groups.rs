//! Group-key derivation from raster and template filenames.
//!
//! Both sides of the template match go through the same explicit rule
//! table, replacing the substring arithmetic of earlier revisions:
//! rasters resolve to a background group key during the render pass,
//! templates resolve to the same key during composition, and the two
//! must agree exactly for a series to land on its canvas.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

/// Trailing unit suffix that depth-ranged variants carry in filenames
/// (`AWP_0-40cm`) but group keys drop.
const DEPTH_UNIT_SUFFIX: &str = "cm";

/// Length of the fixed region prefix on template stems (`CZ_`).
const TEMPLATE_PREFIX_LEN: usize = 3;

/// Structured view of a raster file stem
/// `{indicator}[_{variant}]..._{YYYY-MM-DD}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterName {
    pub indicator: String,
    tokens: Vec<String>,
}

impl RasterName {
    /// Parse a file stem. Always succeeds; an empty stem yields an
    /// empty indicator, which no palette table will know.
    pub fn parse(stem: &str) -> Self {
        let tokens: Vec<String> = stem.split('_').map(str::to_string).collect();
        Self {
            indicator: tokens.first().cloned().unwrap_or_default(),
            tokens,
        }
    }

    /// The trailing date token, if it parses as `YYYY-MM-DD`.
    pub fn date(&self) -> Option<NaiveDate> {
        let token = self.tokens.last()?;
        NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
    }

    /// The raw trailing token, parseable as a date or not.
    pub fn date_token(&self) -> &str {
        self.tokens.last().map(String::as_str).unwrap_or_default()
    }

    /// The background group key this raster's series belongs to.
    ///
    /// - water-availability family (`AW` in the indicator): first two
    ///   tokens joined, with the depth unit suffix dropped
    ///   (`AWP_0-40cm_...` and `AWP_0-40_...` both give `AWP_0-40`);
    /// - fire-weather family (`FWI`): the fixed series `FWI_GenZ`;
    /// - anything else: the indicator code itself.
    pub fn group_key(&self) -> String {
        if self.indicator.contains("AW") {
            let joined = match self.tokens.get(1) {
                Some(variant) => format!("{}_{}", self.indicator, variant),
                None => self.indicator.clone(),
            };
            joined
                .strip_suffix(DEPTH_UNIT_SUFFIX)
                .map(str::to_string)
                .unwrap_or(joined)
        } else if self.indicator.contains("FWI") {
            "FWI_GenZ".to_string()
        } else {
            self.indicator.clone()
        }
    }
}

/// Key a template stem resolves to: drop the fixed region prefix, and
/// for water-family names the trailing depth unit suffix. Returns
/// `None` for stems too short to carry a prefix.
pub fn template_key(stem: &str) -> Option<String> {
    // get() keeps this total: stems shorter than the prefix, or with a
    // multi-byte character straddling it, resolve to no key.
    let key = stem.get(TEMPLATE_PREFIX_LEN..).filter(|k| !k.is_empty())?;
    let key = if key.contains("AW") {
        key.strip_suffix(DEPTH_UNIT_SUFFIX).unwrap_or(key)
    } else {
        key
    };
    Some(key.to_string())
}

/// Human-facing name for a group, used for output files: restores the
/// depth unit suffix for the water family and splits the dead-fuel
/// code (`DFM10H` becomes `DFM_10H`).
pub fn display_key(group_key: &str) -> String {
    let mut name = group_key.to_string();
    if name.contains("DFM") {
        name = name.replace("DFM", "DFM_");
    }
    if name.contains("AW") {
        name.push_str(DEPTH_UNIT_SUFFIX);
    }
    name
}

/// Rendered images collected per background group during the render
/// pass. Built by a single sequential writer; read-only afterwards.
/// Ordered keys keep group iteration deterministic across runs.
#[derive(Debug, Default)]
pub struct BackgroundGroups {
    groups: BTreeMap<String, Vec<PathBuf>>,
}

impl BackgroundGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, image: PathBuf) {
        self.groups.entry(key).or_default().push(image);
    }

    pub fn get(&self, key: &str) -> Option<&[PathBuf]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn image_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_family_collapses_depth_variants() {
        let name = RasterName::parse("AWP_0-40_2024-05-01");
        assert_eq!(name.indicator, "AWP");
        assert_eq!(name.group_key(), "AWP_0-40");

        let with_unit = RasterName::parse("AWP_0-40cm_2024-05-01");
        assert_eq!(with_unit.group_key(), "AWP_0-40");
    }

    #[test]
    fn fire_weather_maps_to_the_fixed_series() {
        let name = RasterName::parse("FWI_GenZ_2024-05-01");
        assert_eq!(name.indicator, "FWI");
        assert_eq!(name.group_key(), "FWI_GenZ");
    }

    #[test]
    fn other_indicators_use_their_own_code() {
        assert_eq!(RasterName::parse("UTCI_2024-05-01").group_key(), "UTCI");
        assert_eq!(RasterName::parse("DFM10H_2024-05-01").group_key(), "DFM10H");
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = RasterName::parse("AWD_0-100cm_2024-01-01").group_key();
        let b = RasterName::parse("AWD_0-100cm_2024-01-01").group_key();
        assert_eq!(a, b);
    }

    #[test]
    fn date_token_parses_or_sorts_first() {
        assert_eq!(
            RasterName::parse("HI_2024-05-01").date(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(RasterName::parse("HI_notadate").date(), None);
    }

    #[test]
    fn template_keys_match_raster_group_keys() {
        assert_eq!(template_key("CZ_AWP_0-40cm").as_deref(), Some("AWP_0-40"));
        assert_eq!(template_key("CZ_UTCI").as_deref(), Some("UTCI"));
        assert_eq!(template_key("CZ_FWI_GenZ").as_deref(), Some("FWI_GenZ"));
        assert_eq!(template_key("CZ"), None);

        let raster_key = RasterName::parse("AWP_0-40cm_2024-05-01").group_key();
        assert_eq!(template_key("CZ_AWP_0-40cm").unwrap(), raster_key);
    }

    #[test]
    fn template_keys_survive_multibyte_stems() {
        // A character straddling the prefix boundary must not panic.
        assert_eq!(template_key("ŘŘ_UTCI"), None);
        assert_eq!(template_key("ŘŘŘ"), None);
    }

    #[test]
    fn display_keys_restore_unit_suffixes() {
        assert_eq!(display_key("AWP_0-40"), "AWP_0-40cm");
        assert_eq!(display_key("DFM10H"), "DFM_10H");
        assert_eq!(display_key("UTCI"), "UTCI");
        assert_eq!(display_key("FWI_GenZ"), "FWI_GenZ");
    }

    #[test]
    fn groups_accumulate_in_insertion_order_per_key() {
        let mut groups = BackgroundGroups::new();
        groups.insert("UTCI".into(), "a.png".into());
        groups.insert("UTCI".into(), "b.png".into());
        groups.insert("AWP_0-40".into(), "c.png".into());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.image_count(), 3);
        assert_eq!(
            groups.get("UTCI").unwrap(),
            &[PathBuf::from("a.png"), PathBuf::from("b.png")]
        );
    }
}
