//! Compositing a series onto a template canvas.
//!
//! Label drawing needs a real TrueType font; these tests use a common
//! system font and skip when none is installed.

use std::path::PathBuf;

use compositor::{slot_position, LayoutCompositor};
use tempfile::TempDir;
use test_utils::write_png;

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
fn composes_seven_maps_in_two_rows() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font available");
        return;
    };
    let dir = TempDir::new().unwrap();

    // Template large enough for two rows of five slots.
    let template = dir.path().join("CZ_UTCI.png");
    write_png(&template, 4400, 2200, [240, 240, 240, 255]);

    let maps: Vec<PathBuf> = (0..7)
        .map(|i| {
            let path = dir.path().join(format!("UTCI_{i}.png"));
            write_png(&path, 100, 100, [0, 100 + i as u8, 0, 255]);
            path
        })
        .collect();
    let labels: Vec<String> = (1..=7).map(|d| format!("0{d}.05.2024")).collect();

    let compositor = LayoutCompositor::new(&font).unwrap();
    let composite = compositor.compose(&template, &maps, &labels).unwrap();
    assert_eq!(composite.dimensions(), (4400, 2200));

    // Slot 5 wraps to row 1, column 0: its cell is painted with the
    // sixth map's color while the template background stays put in
    // untouched areas.
    let (x, y) = slot_position(5);
    let inside = composite.get_pixel(x as u32 + 10, y as u32 + 10);
    assert_eq!(inside.0, [0, 105, 0, 255]);
    let background = composite.get_pixel(4399, 0);
    assert_eq!(background.0, [240, 240, 240, 255]);
}

#[test]
fn label_count_mismatch_is_rejected() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system font available");
        return;
    };
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("CZ_HI.png");
    write_png(&template, 1000, 1100, [255, 255, 255, 255]);
    let map = dir.path().join("HI_0.png");
    write_png(&map, 10, 10, [1, 2, 3, 255]);

    let compositor = LayoutCompositor::new(&font).unwrap();
    let err = compositor
        .compose(&template, &[map], &[])
        .unwrap_err();
    assert!(matches!(
        err,
        compositor::ComposeError::LabelMismatch { images: 1, labels: 0 }
    ));
}
