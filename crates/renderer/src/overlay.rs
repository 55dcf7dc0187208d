//! Vector boundary overlays.
//!
//! Overlay geometry arrives as already-projected GeoJSON (the upstream
//! system owns shapefile handling). Drawing order and styling are
//! fixed: filled sea polygons underneath, thin country outlines, then
//! thick central-country outlines on top.

use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use raster::GeoTransform;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

/// Sea fill color.
const SEA_FILL: Rgba<u8> = Rgba([156, 156, 156, 255]);
/// Country outline color.
const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Country outline width in pixels.
const COUNTRY_WIDTH: i32 = 1;
/// Central/reference country outline width in pixels.
const CENTRAL_WIDTH: i32 = 3;

/// A sequence of projected world coordinates.
pub type Ring = Vec<(f64, f64)>;

/// The three boundary layers drawn over every rendered map.
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    pub sea: Vec<Ring>,
    pub countries: Vec<Ring>,
    pub central_countries: Vec<Ring>,
}

impl OverlaySet {
    /// An empty set, drawing nothing. Useful in tests.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the three layers from GeoJSON files.
    pub fn from_geojson_files(
        sea: &Path,
        countries: &Path,
        central_countries: &Path,
    ) -> Result<Self> {
        let set = Self {
            sea: load_rings(sea)?,
            countries: load_rings(countries)?,
            central_countries: load_rings(central_countries)?,
        };
        debug!(
            sea = set.sea.len(),
            countries = set.countries.len(),
            central = set.central_countries.len(),
            "Loaded overlay geometry"
        );
        Ok(set)
    }
}

/// Draw all overlay layers onto the canvas, in fixed order.
pub fn draw_overlays(canvas: &mut RgbaImage, overlays: &OverlaySet, transform: &GeoTransform) {
    for ring in &overlays.sea {
        draw_filled_ring(canvas, ring, transform, SEA_FILL);
    }
    for ring in &overlays.countries {
        draw_outline(canvas, ring, transform, OUTLINE, COUNTRY_WIDTH);
    }
    for ring in &overlays.central_countries {
        draw_outline(canvas, ring, transform, OUTLINE, CENTRAL_WIDTH);
    }
}

fn to_pixels(ring: &[(f64, f64)], transform: &GeoTransform) -> Vec<(f32, f32)> {
    ring.iter()
        .map(|&(x, y)| {
            let (px, py) = transform.world_to_pixel(x, y);
            (px as f32, py as f32)
        })
        .collect()
}

fn draw_filled_ring(
    canvas: &mut RgbaImage,
    ring: &[(f64, f64)],
    transform: &GeoTransform,
    color: Rgba<u8>,
) {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.len());
    for (x, y) in to_pixels(ring, transform) {
        let point = Point::new(x.round() as i32, y.round() as i32);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    // draw_polygon_mut requires an open ring with at least three
    // distinct vertices.
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() >= 3 {
        draw_polygon_mut(canvas, &points, color);
    }
}

fn draw_outline(
    canvas: &mut RgbaImage,
    ring: &[(f64, f64)],
    transform: &GeoTransform,
    color: Rgba<u8>,
    width: i32,
) {
    let pixels = to_pixels(ring, transform);
    for pair in pixels.windows(2) {
        draw_thick_segment(canvas, pair[0], pair[1], color, width);
    }
}

fn draw_thick_segment(
    canvas: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    color: Rgba<u8>,
    width: i32,
) {
    let half = width / 2;
    for dx in -half..=half {
        for dy in -half..=half {
            draw_line_segment_mut(
                canvas,
                (start.0 + dx as f32, start.1 + dy as f32),
                (end.0 + dx as f32, end.1 + dy as f32),
                color,
            );
        }
    }
}

// GeoJSON subset: enough to pull rings out of (Multi)Polygon and
// (Multi)LineString features. Coordinates keep only x/y, extra
// dimensions are ignored.

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
}

fn load_rings(path: &Path) -> Result<Vec<Ring>> {
    let text = fs::read_to_string(path)?;
    let collection: FeatureCollection = serde_json::from_str(&text)?;

    let mut rings = Vec::new();
    for feature in collection.features {
        match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                rings.extend(coordinates.into_iter().map(positions_to_ring));
            }
            Some(Geometry::MultiPolygon { coordinates }) => {
                for polygon in coordinates {
                    rings.extend(polygon.into_iter().map(positions_to_ring));
                }
            }
            Some(Geometry::LineString { coordinates }) => {
                rings.push(positions_to_ring(coordinates));
            }
            Some(Geometry::MultiLineString { coordinates }) => {
                rings.extend(coordinates.into_iter().map(positions_to_ring));
            }
            None => {}
        }
    }
    Ok(rings)
}

fn positions_to_ring(positions: Vec<Vec<f64>>) -> Ring {
    positions
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geojson_rings_load_from_all_geometry_kinds() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("layers.geojson");
        std::fs::write(
            &path,
            r#"{
              "type": "FeatureCollection",
              "features": [
                {"type": "Feature", "geometry": {"type": "Polygon",
                 "coordinates": [[[0,0],[4,0],[4,4],[0,4],[0,0]]]}},
                {"type": "Feature", "geometry": {"type": "MultiLineString",
                 "coordinates": [[[0,0],[1,1]],[[2,2],[3,3]]]}},
                {"type": "Feature", "geometry": null}
              ]
            }"#,
        )
        .unwrap();
        let rings = load_rings(&path).unwrap();
        assert_eq!(rings.len(), 3);
        assert_eq!(rings[0].len(), 5);
    }

    #[test]
    fn filled_ring_paints_interior_pixels() {
        let mut canvas = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let ring = vec![(1.0, 1.0), (6.0, 1.0), (6.0, 6.0), (1.0, 6.0), (1.0, 1.0)];
        // Pixel-space transform keeps world == pixel coordinates.
        let transform = GeoTransform::pixel_space();
        let flipped: Ring = ring.iter().map(|&(x, y)| (x, -y)).collect();
        draw_filled_ring(&mut canvas, &flipped, &transform, SEA_FILL);
        assert_eq!(*canvas.get_pixel(3, 3), SEA_FILL);
        assert_eq!(*canvas.get_pixel(7, 7), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn degenerate_rings_are_skipped() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let transform = GeoTransform::pixel_space();
        draw_filled_ring(&mut canvas, &[(1.0, -1.0), (1.0, -1.0)], &transform, SEA_FILL);
        assert!(canvas.pixels().all(|p| p.0[3] == 0));
    }
}
