//! Built-in palette tables.
//!
//! Boundary, class and color values are fixed product data, not
//! configuration. The reserved class ids `-999` and `-1` mark cells
//! without a valid measurement and always render white.

use std::collections::HashMap;

use crate::{Palette, Rgb};

/// Indicators whose rasters already carry class values and skip the
/// classification step.
pub const PRECLASSIFIED: [&str; 2] = ["AWP", "FWI"];

/// Parameter names used to select input rasters and match templates.
pub const PARAMETERS: [&str; 13] = [
    "AWD_0-40",  // Available Water Depth 0-40 cm
    "AWR_0-40",  // Available Water Reserve 0-40 cm
    "AWP_0-40",  // Available Water Potential 0-40 cm
    "AWD_0-100", // Available Water Depth 0-100 cm
    "AWR_0-100", // Available Water Reserve 0-100 cm
    "AWP_0-100", // Available Water Potential 0-100 cm
    "AWD_0-200", // Available Water Depth 0-200 cm
    "AWR_0-200", // Available Water Reserve 0-200 cm
    "AWP_0-200", // Available Water Potential 0-200 cm
    "FWI_GenZ",  // Fire Weather Index
    "DFM10H",    // Dead Fuel Moisture, 10-hour
    "HI",        // Heat Index
    "UTCI",      // Universal Thermal Climate Index
];

const WHITE: Rgb = Rgb::new(255, 255, 255);

fn awp() -> Palette {
    Palette {
        colors: vec![
            WHITE, // -999 (no data)
            WHITE, // -1 (no data)
            Rgb::new(189, 0, 38),    // Extreme
            Rgb::new(240, 59, 32),   // Exceptional
            Rgb::new(253, 141, 60),  // Severe
            Rgb::new(254, 178, 76),  // Moderate
            Rgb::new(254, 217, 118), // Minor
            Rgb::new(255, 255, 178), // Slightly
            WHITE, // unclassified remainder
        ],
        boundaries: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        classes: vec![-999, -1, 0, 1, 2, 3, 4, 5, 6],
        continuous: false,
    }
}

fn awd() -> Palette {
    Palette {
        colors: vec![
            WHITE,
            WHITE,
            Rgb::new(33, 102, 172),  // below -60
            Rgb::new(103, 169, 207), // -60 to -31
            Rgb::new(209, 229, 240), // -30 to -1
            Rgb::new(253, 219, 199), // 0 to 30
            Rgb::new(239, 138, 98),  // 31 to 60
            Rgb::new(178, 24, 43),   // above 60
        ],
        boundaries: vec![-200.0, -60.0, -30.0, 0.0, 30.0, 60.0, 200.0],
        classes: vec![-999, -1, 0, 1, 2, 3, 4, 5],
        continuous: false,
    }
}

fn awr() -> Palette {
    Palette {
        colors: vec![
            WHITE,
            WHITE,
            Rgb::new(241, 238, 246), // below 10
            Rgb::new(208, 209, 230), // 11-30
            Rgb::new(166, 189, 219), // 31-50
            Rgb::new(116, 169, 207), // 51-70
            Rgb::new(43, 140, 190),  // 71-90
            Rgb::new(4, 90, 141),    // above 90
        ],
        boundaries: vec![0.0, 10.0, 30.0, 50.0, 70.0, 90.0, 100.0],
        classes: vec![-999, -1, 0, 1, 2, 3, 4, 5],
        continuous: false,
    }
}

fn heat_index() -> Palette {
    Palette {
        colors: vec![
            WHITE,
            WHITE,
            Rgb::new(254, 229, 217), // 27-32 C, caution
            Rgb::new(252, 174, 145), // 32-41 C, extreme caution
            Rgb::new(251, 106, 74),  // 41-54 C, danger
            Rgb::new(203, 24, 29),   // above 54 C, extreme danger
        ],
        boundaries: vec![f64::NEG_INFINITY, 32.0, 41.0, 54.0, 100.0],
        classes: vec![-999, -1, 0, 1, 2, 3],
        continuous: false,
    }
}

fn utci() -> Palette {
    Palette {
        colors: vec![
            Rgb::new(5, 48, 97),     // below -40 C
            Rgb::new(33, 102, 172),  // -40 to -27 C
            Rgb::new(67, 147, 195),  // -27 to -13 C
            Rgb::new(146, 197, 222), // -13 to 0 C
            Rgb::new(209, 229, 240), // 0 to 9 C
            Rgb::new(247, 247, 247), // 9 to 26 C, no stress
            Rgb::new(253, 219, 199), // 26 to 32 C
            Rgb::new(244, 165, 130), // 32 to 38 C
            Rgb::new(214, 96, 77),   // 38 to 46 C
            Rgb::new(178, 24, 43),   // above 46 C
        ],
        boundaries: vec![
            -100.0, -40.0, -27.0, -13.0, 0.0, 9.0, 26.0, 32.0, 38.0, 46.0, 100.0,
        ],
        classes: vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
        continuous: true,
    }
}

fn fwi() -> Palette {
    Palette {
        colors: vec![
            WHITE,
            WHITE,
            Rgb::new(145, 191, 219), // very low
            Rgb::new(224, 243, 248), // low
            Rgb::new(255, 255, 191), // moderate
            Rgb::new(254, 224, 144), // high
            Rgb::new(252, 141, 89),  // very high
            Rgb::new(215, 48, 39),   // extreme
        ],
        boundaries: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        classes: vec![-999, -1, 1, 2, 3, 4, 5, 6],
        continuous: false,
    }
}

fn dfm10h() -> Palette {
    Palette {
        colors: vec![
            WHITE,
            WHITE,
            Rgb::new(178, 24, 43),   // below 6 %
            Rgb::new(214, 96, 77),   // 6-9 %
            Rgb::new(244, 165, 130), // 9-12 %
            Rgb::new(253, 219, 199), // 12-15 %
            Rgb::new(224, 224, 224), // 15-25 %
            Rgb::new(186, 186, 186), // 25-35 %
        ],
        boundaries: vec![-0.9, 6.0, 9.0, 12.0, 15.0, 25.0, 35.0],
        classes: vec![-999, -1, 0, 1, 2, 3, 4, 5],
        continuous: false,
    }
}

/// Reduced water-availability potential table: the two most severe
/// bands share one color, keeping the public maps legible at small
/// sizes.
fn awp_reduced() -> Palette {
    let mut palette = awp();
    palette.colors[3] = palette.colors[2];
    palette
}

fn awd_reduced() -> Palette {
    let mut palette = awd();
    palette.colors[2] = palette.colors[3];
    palette.colors[7] = palette.colors[6];
    palette
}

fn awr_reduced() -> Palette {
    let mut palette = awr();
    palette.colors[7] = palette.colors[6];
    palette
}

/// Full band tables for the primary output tree.
pub fn primary_palettes() -> HashMap<String, Palette> {
    [
        ("AWP", awp()),
        ("AWD", awd()),
        ("AWR", awr()),
        ("HI", heat_index()),
        ("UTCI", utci()),
        ("FWI", fwi()),
        ("DFM10H", dfm10h()),
    ]
    .into_iter()
    .map(|(code, palette)| (code.to_string(), palette))
    .collect()
}

/// Coarser water-family tables for the reduced output tree.
pub fn reduced_palettes() -> HashMap<String, Palette> {
    let mut palettes = primary_palettes();
    palettes.insert("AWP".to_string(), awp_reduced());
    palettes.insert("AWD".to_string(), awd_reduced());
    palettes.insert("AWR".to_string(), awr_reduced());
    palettes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtin_tables_are_valid() {
        for (indicator, palette) in primary_palettes().into_iter().chain(reduced_palettes()) {
            palette
                .validate(&indicator)
                .unwrap_or_else(|e| panic!("invalid built-in palette: {e}"));
        }
    }

    #[test]
    fn utci_is_the_only_continuous_table() {
        let continuous: Vec<String> = primary_palettes()
            .into_iter()
            .filter(|(_, p)| p.continuous)
            .map(|(code, _)| code)
            .collect();
        assert_eq!(continuous, vec!["UTCI".to_string()]);
    }

    #[test]
    fn utci_has_no_reserved_class_slots() {
        assert_eq!(utci().nodata_slots(), 0);
        assert_eq!(awd().nodata_slots(), 2);
    }

    #[test]
    fn reduced_variant_only_touches_the_water_family() {
        let primary = primary_palettes();
        let reduced = reduced_palettes();
        for code in ["HI", "UTCI", "FWI", "DFM10H"] {
            assert_eq!(primary[code].colors, reduced[code].colors, "{code}");
        }
        assert_ne!(primary["AWP"].colors, reduced["AWP"].colors);
        assert_eq!(primary["AWP"].boundaries, reduced["AWP"].boundaries);
    }
}
