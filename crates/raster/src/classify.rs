//! Severity classification of raw indicator values.

use palette::Palette;

use crate::grid::{ClassifiedRaster, RasterAsset};

/// Bin a raster's values into integer class codes using right-closed
/// bins: value `v` lands in class `i-1` where
/// `boundaries[i-1] < v <= boundaries[i]`. The shift by one aligns
/// class codes with the palette's class table, whose leading entries
/// are the reserved no-data slots.
///
/// Values below the first boundary or above the last clamp to the
/// extreme bins. No-data cells (the file's declared sentinel or −999)
/// pass through verbatim so downstream masking still detects them.
pub fn classify(raster: &RasterAsset, boundaries: &[f64]) -> ClassifiedRaster {
    debug_assert!(boundaries.len() >= 2);
    let max_class = (boundaries.len() - 2) as i64;
    let nodata = clamp_to_i16(raster.nodata_value());

    let data = raster
        .data
        .iter()
        .map(|&value| {
            if raster.is_nodata(value) {
                clamp_to_i16(value as f64)
            } else {
                let v = value as f64;
                let bin = boundaries.partition_point(|b| *b < v) as i64 - 1;
                bin.clamp(0, max_class) as i16
            }
        })
        .collect();

    ClassifiedRaster {
        width: raster.width,
        height: raster.height,
        data,
        transform: raster.transform,
        nodata,
    }
}

/// Whether a palette's raster values already match its class table and
/// classification can be skipped for this indicator.
pub fn needs_classification(table: &palette::PaletteTable, indicator: &str) -> bool {
    !table.is_preclassified(indicator)
}

/// Pick the boundaries to classify against.
pub fn boundaries_of(palette: &Palette) -> &[f64] {
    &palette.boundaries
}

fn clamp_to_i16(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
