//! Cross-checks against published reference values and the `palette` crate.
//!
//! Run with: `cargo test -p tinct-core --test reference`

use palette::color_difference::Ciede2000;
use palette::white_point::D65;
use palette::{FromColor, Srgb};

use tinct_core::metrics::{
    Ciede2000Weights, contrast_ratio, delta_e_2000_lab, delta_e_2000_weighted, relative_luminance,
};
use tinct_core::{ColorValue, Lab};

/// Pairs from Sharma, Wu & Dalal (2005), Table 1.
const SHARMA_PAIRS: &[([f64; 3], [f64; 3], f64)] = &[
    ([50.0, 2.6772, -79.7751], [50.0, 0.0, -82.7485], 2.0425),
    ([50.0, 3.1571, -77.2803], [50.0, 0.0, -82.7485], 2.8615),
    ([50.0, 2.8361, -74.0200], [50.0, 0.0, -82.7485], 3.4412),
    ([50.0, -1.3802, -84.2814], [50.0, 0.0, -82.7485], 1.0000),
    ([50.0, -1.1848, -84.8006], [50.0, 0.0, -82.7485], 1.0000),
    ([50.0, -0.9009, -85.5211], [50.0, 0.0, -82.7485], 1.0000),
    ([50.0, 0.0, 0.0], [50.0, -1.0, 2.0], 2.3669),
    ([50.0, -1.0, 2.0], [50.0, 0.0, 0.0], 2.3669),
    ([50.0, 2.4900, -0.0010], [50.0, -2.4900, 0.0009], 7.1792),
    ([50.0, 2.4900, -0.0010], [50.0, -2.4900, 0.0010], 7.1792),
    ([50.0, 2.4900, -0.0010], [50.0, -2.4900, 0.0011], 7.2195),
    ([50.0, 2.4900, -0.0010], [50.0, -2.4900, 0.0012], 7.2195),
    ([50.0, -0.0010, 2.4900], [50.0, 0.0009, -2.4900], 4.8045),
    ([50.0, -0.0010, 2.4900], [50.0, 0.0011, -2.4900], 4.7461),
    ([50.0, 2.5, 0.0], [50.0, 0.0, -2.5], 4.3065),
    ([50.0, 2.5, 0.0], [73.0, 25.0, -18.0], 27.1492),
    ([50.0, 2.5, 0.0], [61.0, -5.0, 29.0], 22.8977),
    ([50.0, 2.5, 0.0], [56.0, -27.0, -3.0], 31.9030),
    ([50.0, 2.5, 0.0], [58.0, 24.0, 15.0], 19.4535),
    ([50.0, 2.5, 0.0], [50.0, 3.1736, 0.5854], 1.0000),
    ([50.0, 2.5, 0.0], [50.0, 3.2972, 0.0], 1.0000),
    ([50.0, 2.5, 0.0], [50.0, 1.8634, 0.5757], 1.0000),
    ([50.0, 2.5, 0.0], [50.0, 3.2592, 0.3350], 1.0000),
    ([60.2574, -34.0099, 36.2677], [60.4626, -34.1751, 39.4387], 1.2644),
    ([63.0109, -31.0961, -5.8663], [62.8187, -29.7946, -4.0864], 1.2630),
    ([61.2901, 3.7196, -5.3901], [61.4292, 2.2480, -4.9620], 1.8731),
    ([35.0831, -44.1164, 3.7933], [35.0232, -40.0716, 1.5901], 1.8645),
    ([22.7233, 20.0904, -46.6940], [23.0331, 14.9730, -42.5619], 2.0373),
    ([36.4612, 47.8580, 18.3852], [36.2715, 50.5065, 21.2231], 1.4146),
    ([90.8027, -2.0831, 1.4410], [91.1528, -1.6435, 0.0447], 1.4441),
    ([90.9257, -0.5406, -0.9208], [88.6381, -0.8985, -0.7239], 1.5381),
    ([6.7747, -0.2908, -2.4247], [5.8714, -0.0985, -2.2286], 0.6377),
    ([2.0776, 0.0795, -1.1350], [0.9033, -0.0636, -0.5514], 0.9082),
];

fn lab(v: [f64; 3]) -> Lab {
    Lab::new(v[0], v[1], v[2])
}

fn palette_lab(v: [f64; 3]) -> palette::Lab<D65, f64> {
    palette::Lab::new(v[0], v[1], v[2])
}

fn sample_colors() -> Vec<ColorValue> {
    let mut colors = Vec::new();
    for r in (0..=255u8).step_by(51) {
        for g in (0..=255u8).step_by(51) {
            for b in (0..=255u8).step_by(51) {
                colors.push(ColorValue::from_rgb(r, g, b));
            }
        }
    }
    for hex in ["#1890ff", "#fa541c", "#52c41a", "#722ed1", "#faad14"] {
        colors.push(ColorValue::parse(hex).unwrap());
    }
    colors
}

fn srgb_of(color: &ColorValue) -> Srgb<f64> {
    let [r, g, b] = color.to_rgb().to_unit();
    Srgb::new(r, g, b)
}

#[test]
fn test_ciede2000_sharma_table() {
    for (i, &(a, b, expected)) in SHARMA_PAIRS.iter().enumerate() {
        let de = delta_e_2000_lab(lab(a), lab(b));
        assert!((de - expected).abs() < 1e-4, "pair {}: got {de:.4}, expected {expected}", i + 1);
    }
}

#[test]
fn test_ciede2000_unit_weights_match_plain() {
    for &(a, b, _) in SHARMA_PAIRS {
        let plain = delta_e_2000_lab(lab(a), lab(b));
        let weighted = delta_e_2000_weighted(lab(a), lab(b), Ciede2000Weights::default());
        assert_eq!(plain, weighted);
    }
}

#[test]
fn test_ciede2000_matches_palette() {
    for &(a, b, _) in SHARMA_PAIRS {
        let ours = delta_e_2000_lab(lab(a), lab(b));
        let theirs = palette_lab(a).difference(palette_lab(b));
        assert!((ours - theirs).abs() < 1e-3, "{a:?} vs {b:?}: {ours} != {theirs}");
    }
}

#[test]
fn test_lab_matches_palette() {
    for color in sample_colors() {
        let ours = color.to_lab();
        let theirs = palette::Lab::<D65, f64>::from_color(srgb_of(&color));
        assert!((ours.l - theirs.l).abs() < 0.05, "{color}: L {} vs {}", ours.l, theirs.l);
        assert!((ours.a - theirs.a).abs() < 0.05, "{color}: a {} vs {}", ours.a, theirs.a);
        assert!((ours.b - theirs.b).abs() < 0.05, "{color}: b {} vs {}", ours.b, theirs.b);
    }
}

#[test]
fn test_oklab_matches_palette() {
    for color in sample_colors() {
        let ours = color.to_oklab();
        let theirs = palette::Oklab::<f64>::from_color(srgb_of(&color));
        assert!((ours.l - theirs.l).abs() < 1e-3, "{color}: L {} vs {}", ours.l, theirs.l);
        assert!((ours.a - theirs.a).abs() < 1e-3, "{color}: a {} vs {}", ours.a, theirs.a);
        assert!((ours.b - theirs.b).abs() < 1e-3, "{color}: b {} vs {}", ours.b, theirs.b);
    }
}

#[test]
fn test_hsl_matches_palette() {
    for color in sample_colors() {
        let ours = color.to_hsl();
        let theirs = palette::Hsl::<palette::encoding::Srgb, f64>::from_color(srgb_of(&color));
        assert!((ours.s - theirs.saturation * 100.0).abs() < 1e-6, "{color}");
        assert!((ours.l - theirs.lightness * 100.0).abs() < 1e-6, "{color}");
        if ours.s > 0.0 {
            let hue_gap = (ours.h - theirs.hue.into_positive_degrees()).abs();
            assert!(hue_gap < 1e-6 || (hue_gap - 360.0).abs() < 1e-6, "{color}: hue {}", ours.h);
        }
    }
}

#[test]
fn test_relative_luminance_matches_palette() {
    for color in sample_colors() {
        let linear = srgb_of(&color).into_linear::<f64>();
        let expected = 0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue;
        assert!((relative_luminance(&color) - expected).abs() < 1e-6, "{color}");
    }
}

#[test]
fn test_wcag_reference_ratios() {
    let black = ColorValue::parse("black").unwrap();
    let white = ColorValue::parse("white").unwrap();
    assert!((contrast_ratio(&black, &white) - 21.0).abs() < 1e-9);

    // Commonly cited pairs from the WCAG understanding documents.
    let gray = ColorValue::parse("#767676").unwrap();
    assert!((contrast_ratio(&gray, &white) - 4.54).abs() < 0.01);
    let blue = ColorValue::parse("#1890ff").unwrap();
    assert!((contrast_ratio(&blue, &white) - 3.24).abs() < 0.01);
}
