//! Palette-driven color mapping.
//!
//! Two regimes exist, selected by the palette's `continuous` flag:
//! hard-edged class coloring for discrete indicators and a
//! piecewise-linear gradient for continuous ones. Both clamp outside
//! their anchored range rather than failing.

use palette::{Palette, Rgb};

use crate::error::{RenderError, Result};

/// Stepped class-to-color lookup. Values fall into left-closed bins
/// anchored at the palette's class ids; out-of-range values extend to
/// the nearest extreme color.
pub struct DiscreteScale {
    anchors: Vec<f64>,
    colors: Vec<Rgb>,
}

impl DiscreteScale {
    pub fn new(palette: &Palette) -> Result<Self> {
        if palette.colors.is_empty() {
            return Err(RenderError::EmptyPalette);
        }
        Ok(Self {
            anchors: palette.classes.iter().map(|c| *c as f64).collect(),
            colors: palette.colors.clone(),
        })
    }

    pub fn color_for(&self, value: f64) -> Rgb {
        // Left-closed bins: anchors[i] <= v < anchors[i+1] selects
        // colors[i]; both ends extend.
        let index = match self.anchors.partition_point(|a| *a <= value) {
            0 => 0,
            n => n - 1,
        };
        self.colors[index.min(self.colors.len() - 1)]
    }
}

/// Piecewise-linear gradient. Anchor positions come from rescaling the
/// palette boundaries (after any leading no-data slots) into [0, 1]
/// against the first and last boundary and pairing them index-wise
/// with the colors; surplus trailing boundaries only widen the value
/// range.
pub struct ContinuousScale {
    anchors: Vec<(f64, Rgb)>,
    min_value: f64,
    max_value: f64,
}

impl ContinuousScale {
    pub fn new(palette: &Palette) -> Result<Self> {
        let skip = palette
            .nodata_slots()
            .min(palette.boundaries.len().saturating_sub(2));
        let bounds = &palette.boundaries[skip..];
        let colors = &palette.colors[skip.min(palette.colors.len())..];

        let first = bounds[0];
        let last = *bounds.last().unwrap_or(&first);
        let span = last - first;
        if !(span > 0.0) || colors.len() < 2 {
            return Err(RenderError::DegenerateGradient);
        }

        let anchors = bounds
            .iter()
            .zip(colors.iter())
            .map(|(b, c)| (((b - first) / span).clamp(0.0, 1.0), *c))
            .collect();

        Ok(Self {
            anchors,
            min_value: first,
            max_value: last,
        })
    }

    pub fn color_for(&self, value: f64) -> Rgb {
        let t = ((value - self.min_value) / (self.max_value - self.min_value)).clamp(0.0, 1.0);

        let mut lower = self.anchors[0];
        for &upper in &self.anchors[1..] {
            if t <= upper.0 {
                return lerp_rgb(lower.1, upper.1, segment_fraction(lower.0, upper.0, t));
            }
            lower = upper;
        }
        lower.1
    }
}

fn segment_fraction(low: f64, high: f64, t: f64) -> f64 {
    if high - low <= f64::EPSILON {
        0.0
    } else {
        ((t - low) / (high - low)).clamp(0.0, 1.0)
    }
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Either scale, picked from the palette's continuous flag.
pub enum ColorScale {
    Discrete(DiscreteScale),
    Continuous(ContinuousScale),
}

impl ColorScale {
    pub fn from_palette(palette: &Palette) -> Result<Self> {
        if palette.continuous {
            Ok(ColorScale::Continuous(ContinuousScale::new(palette)?))
        } else {
            Ok(ColorScale::Discrete(DiscreteScale::new(palette)?))
        }
    }

    pub fn color_for(&self, value: f64) -> Rgb {
        match self {
            ColorScale::Discrete(s) => s.color_for(value),
            ColorScale::Continuous(s) => s.color_for(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discrete_palette() -> Palette {
        Palette {
            boundaries: vec![0.0, 1.0, 2.0],
            colors: vec![
                Rgb::new(255, 255, 255),
                Rgb::new(255, 255, 255),
                Rgb::new(10, 0, 0),
                Rgb::new(0, 20, 0),
            ],
            classes: vec![-999, -1, 0, 1],
            continuous: false,
        }
    }

    #[test]
    fn discrete_scale_uses_left_closed_bins() {
        let scale = DiscreteScale::new(&discrete_palette()).unwrap();
        assert_eq!(scale.color_for(0.0), Rgb::new(10, 0, 0));
        assert_eq!(scale.color_for(0.9), Rgb::new(10, 0, 0));
        assert_eq!(scale.color_for(1.0), Rgb::new(0, 20, 0));
        assert_eq!(scale.color_for(-1.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn discrete_scale_extends_past_both_ends() {
        let scale = DiscreteScale::new(&discrete_palette()).unwrap();
        assert_eq!(scale.color_for(-5000.0), Rgb::new(255, 255, 255));
        assert_eq!(scale.color_for(99.0), Rgb::new(0, 20, 0));
    }

    #[test]
    fn continuous_midpoint_interpolates_linearly() {
        let palette = Palette {
            boundaries: vec![-40.0, 0.0, 40.0],
            colors: vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)],
            classes: vec![0, 1],
            continuous: true,
        };
        let scale = ContinuousScale::new(&palette).unwrap();
        let grey = scale.color_for(-20.0);
        assert!((grey.r as i32 - 128).abs() <= 1, "got {:?}", grey);
        assert_eq!(grey.r, grey.g);
        assert_eq!(grey.g, grey.b);
        assert_eq!(scale.color_for(-40.0), Rgb::new(0, 0, 0));
        assert_eq!(scale.color_for(0.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn continuous_clamps_outside_the_anchored_range() {
        let palette = Palette {
            boundaries: vec![-40.0, 0.0, 40.0],
            colors: vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)],
            classes: vec![0, 1],
            continuous: true,
        };
        let scale = ContinuousScale::new(&palette).unwrap();
        assert_eq!(scale.color_for(-1000.0), Rgb::new(0, 0, 0));
        // Past the last color anchor the gradient holds its end color.
        assert_eq!(scale.color_for(20.0), Rgb::new(255, 255, 255));
        assert_eq!(scale.color_for(1000.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn degenerate_gradient_is_rejected() {
        let palette = Palette {
            boundaries: vec![5.0, 5.0],
            colors: vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)],
            classes: vec![0, 1],
            continuous: true,
        };
        assert!(matches!(
            ContinuousScale::new(&palette),
            Err(RenderError::DegenerateGradient)
        ));
    }

    #[test]
    fn utci_gradient_builds_from_the_builtin_table() {
        let table = palette::PaletteTable::primary();
        let scale = ContinuousScale::new(table.get("UTCI").unwrap()).unwrap();
        // Cold end is deep blue, warm end deep red.
        assert_eq!(scale.color_for(-100.0), Rgb::new(5, 48, 97));
        assert_eq!(scale.color_for(100.0), Rgb::new(178, 24, 43));
    }
}
