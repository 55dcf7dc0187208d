//! Severity-band palettes for climate indicator maps.
//!
//! Each indicator code (e.g. `AWP`, `UTCI`, `FWI`) owns a fixed,
//! hand-authored table of class boundaries, class ids and colors. Two
//! variants of the registry exist: the primary set and a reduced set
//! with coarser bands for the water-availability family. Registries are
//! plain immutable values injected into the classifier and renderer;
//! there is no global palette state.

pub mod tables;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class ids reserved for cells without a valid measurement.
pub const NODATA_CLASSES: [i16; 2] = [-999, -1];

/// Errors raised by palette lookup and validation.
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("No palette registered for indicator '{0}'")]
    UnknownIndicator(String),

    #[error("Palette '{indicator}': {colors} colors but {classes} classes")]
    LengthMismatch {
        indicator: String,
        colors: usize,
        classes: usize,
    },

    #[error("Palette '{indicator}': needs at least two boundaries, got {count}")]
    TooFewBoundaries { indicator: String, count: usize },

    #[error("Palette '{indicator}': boundaries must be non-decreasing at index {index}")]
    UnorderedBoundaries { indicator: String, index: usize },

    #[error("Palette '{indicator}': boundary {index} is not a finite number")]
    InvalidBoundary { indicator: String, index: usize },
}

pub type Result<T> = std::result::Result<T, PaletteError>;

/// An opaque RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Classification and coloring table for a single indicator.
///
/// `boundaries` partitions the value axis into right-closed bins,
/// `classes` lists the class ids emitted by classification (possibly
/// led by the reserved no-data sentinels) and `colors` pairs with
/// `classes` one to one. `continuous` selects gradient interpolation
/// instead of hard-edged class coloring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub boundaries: Vec<f64>,
    pub colors: Vec<Rgb>,
    pub classes: Vec<i16>,
    pub continuous: bool,
}

impl Palette {
    /// Build a palette, rejecting tables that break the invariants.
    pub fn new(
        indicator: &str,
        boundaries: Vec<f64>,
        colors: Vec<Rgb>,
        classes: Vec<i16>,
        continuous: bool,
    ) -> Result<Self> {
        let palette = Self {
            boundaries,
            colors,
            classes,
            continuous,
        };
        palette.validate(indicator)?;
        Ok(palette)
    }

    /// Check the table invariants: equal color/class counts and
    /// non-decreasing boundaries. A leading negative-infinity sentinel
    /// is permitted; any other non-finite boundary is rejected.
    pub fn validate(&self, indicator: &str) -> Result<()> {
        if self.colors.len() != self.classes.len() {
            return Err(PaletteError::LengthMismatch {
                indicator: indicator.to_string(),
                colors: self.colors.len(),
                classes: self.classes.len(),
            });
        }
        if self.boundaries.len() < 2 {
            return Err(PaletteError::TooFewBoundaries {
                indicator: indicator.to_string(),
                count: self.boundaries.len(),
            });
        }
        for (index, value) in self.boundaries.iter().enumerate() {
            let leading_sentinel = index == 0 && *value == f64::NEG_INFINITY;
            if !value.is_finite() && !leading_sentinel {
                return Err(PaletteError::InvalidBoundary {
                    indicator: indicator.to_string(),
                    index,
                });
            }
        }
        for (index, pair) in self.boundaries.windows(2).enumerate() {
            if pair[0] > pair[1] {
                return Err(PaletteError::UnorderedBoundaries {
                    indicator: indicator.to_string(),
                    index: index + 1,
                });
            }
        }
        Ok(())
    }

    /// Number of leading class slots reserved for no-data sentinels.
    pub fn nodata_slots(&self) -> usize {
        self.classes.iter().take_while(|c| **c < 0).count()
    }

    /// Number of right-closed value bins the boundaries define.
    pub fn bin_count(&self) -> usize {
        self.boundaries.len() - 1
    }
}

/// Which registry variant a template subtree selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteVariant {
    Primary,
    Reduced,
}

impl PaletteVariant {
    /// Path component that marks a template subtree as reduced.
    pub const REDUCED_SUBTREE: &'static str = "reduced";

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteVariant::Primary => "primary",
            PaletteVariant::Reduced => "reduced",
        }
    }
}

/// Immutable registry of palettes for one variant, keyed by indicator
/// code, plus the set of indicators whose rasters already carry class
/// values and therefore skip classification.
#[derive(Debug, Clone)]
pub struct PaletteTable {
    variant: PaletteVariant,
    palettes: HashMap<String, Palette>,
    preclassified: HashSet<&'static str>,
}

impl PaletteTable {
    /// The primary registry with the full band tables.
    pub fn primary() -> Self {
        Self {
            variant: PaletteVariant::Primary,
            palettes: tables::primary_palettes(),
            preclassified: tables::PRECLASSIFIED.iter().copied().collect(),
        }
    }

    /// The reduced registry: coarser bands for the water-availability
    /// family, identical tables otherwise.
    pub fn reduced() -> Self {
        Self {
            variant: PaletteVariant::Reduced,
            palettes: tables::reduced_palettes(),
            preclassified: tables::PRECLASSIFIED.iter().copied().collect(),
        }
    }

    pub fn for_variant(variant: PaletteVariant) -> Self {
        match variant {
            PaletteVariant::Primary => Self::primary(),
            PaletteVariant::Reduced => Self::reduced(),
        }
    }

    pub fn variant(&self) -> PaletteVariant {
        self.variant
    }

    /// Look up the palette for an indicator code.
    pub fn get(&self, indicator: &str) -> Result<&Palette> {
        self.palettes
            .get(indicator)
            .ok_or_else(|| PaletteError::UnknownIndicator(indicator.to_string()))
    }

    /// Whether rasters of this indicator already carry class values.
    pub fn is_preclassified(&self, indicator: &str) -> bool {
        self.preclassified.contains(indicator)
    }

    pub fn indicators(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(n: usize) -> Vec<Rgb> {
        (0..n).map(|i| Rgb::new(i as u8, 0, 0)).collect()
    }

    #[test]
    fn new_accepts_valid_table() {
        let palette = Palette::new(
            "T",
            vec![0.0, 10.0, 20.0],
            colors(4),
            vec![-999, -1, 0, 1],
            false,
        )
        .unwrap();
        assert_eq!(palette.nodata_slots(), 2);
        assert_eq!(palette.bin_count(), 2);
    }

    #[test]
    fn new_accepts_leading_negative_infinity() {
        let palette = Palette::new(
            "T",
            vec![f64::NEG_INFINITY, 32.0, 41.0],
            colors(3),
            vec![-999, -1, 0],
            false,
        );
        assert!(palette.is_ok());
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Palette::new("T", vec![0.0, 1.0], colors(3), vec![0, 1], false).unwrap_err();
        assert!(matches!(err, PaletteError::LengthMismatch { .. }));
    }

    #[test]
    fn new_rejects_decreasing_boundaries() {
        let err = Palette::new(
            "T",
            vec![0.0, 10.0, 5.0],
            colors(2),
            vec![0, 1],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PaletteError::UnorderedBoundaries { index: 2, .. }));
    }

    #[test]
    fn new_rejects_interior_infinity() {
        let err = Palette::new(
            "T",
            vec![0.0, f64::INFINITY, 5.0],
            colors(2),
            vec![0, 1],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, PaletteError::InvalidBoundary { index: 1, .. }));
    }

    #[test]
    fn unknown_indicator_is_an_error() {
        let table = PaletteTable::primary();
        let err = table.get("XYZ").unwrap_err();
        assert!(matches!(err, PaletteError::UnknownIndicator(_)));
    }

    #[test]
    fn preclassified_set_matches_policy() {
        let table = PaletteTable::primary();
        assert!(table.is_preclassified("AWP"));
        assert!(table.is_preclassified("FWI"));
        assert!(!table.is_preclassified("AWD"));
        assert!(!table.is_preclassified("UTCI"));
    }
}
