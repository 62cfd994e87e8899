//! Property tests for conversions and metrics.
//!
//! - Every space reproduces the 8-bit channels within ±1 after a round trip
//! - delta-E is zero on identity and symmetric
//! - Contrast ratio stays in [1, 21] and ignores argument order
//! - Hex and string forms parse back to the same color

use proptest::prelude::*;

use tinct_core::convert::{project, unproject};
use tinct_core::metrics::{contrast_ratio, delta_e_2000, delta_e_oklab, delta_e76};
use tinct_core::{ColorSpace, ColorValue, Rgb};

fn arb_rgb() -> impl Strategy<Value = Rgb> {
    any::<[u8; 3]>().prop_map(|[r, g, b]| Rgb::new(r, g, b))
}

fn arb_color() -> impl Strategy<Value = ColorValue> {
    arb_rgb().prop_map(ColorValue::new)
}

fn channel_drift(a: Rgb, b: Rgb) -> u8 {
    a.r.abs_diff(b.r).max(a.g.abs_diff(b.g)).max(a.b.abs_diff(b.b))
}

fn assert_roundtrip(rgb: Rgb) {
    for &space in ColorSpace::all() {
        let back = unproject(&project(rgb, space));
        assert!(
            channel_drift(rgb, back) <= 1,
            "{space}: {rgb:?} came back as {back:?}"
        );
    }
}

#[test]
fn test_roundtrip_grid_sweep() {
    // Every 15th level hits both ends of each channel.
    for r in (0..=255u8).step_by(15) {
        for g in (0..=255u8).step_by(15) {
            for b in (0..=255u8).step_by(15) {
                assert_roundtrip(Rgb::new(r, g, b));
            }
        }
    }
}

#[test]
fn test_roundtrip_grays() {
    for v in 0..=255u8 {
        assert_roundtrip(Rgb::new(v, v, v));
    }
}

proptest! {
    #[test]
    fn roundtrip_every_space(rgb in arb_rgb()) {
        for &space in ColorSpace::all() {
            let back = unproject(&project(rgb, space));
            prop_assert!(channel_drift(rgb, back) <= 1, "{} drifted: {:?} -> {:?}", space, rgb, back);
        }
    }

    #[test]
    fn roundtrip_through_value_accessors(color in arb_color()) {
        let rgb = color.to_rgb();
        let checks = [
            ColorValue::from_hsl(color.to_hsl()),
            ColorValue::from_hsv(color.to_hsv()),
            ColorValue::from_hwb(color.to_hwb()),
            ColorValue::from_xyz(color.to_xyz()),
            ColorValue::from_lab(color.to_lab()),
            ColorValue::from_lch(color.to_lch()),
            ColorValue::from_oklab(color.to_oklab()),
            ColorValue::from_oklch(color.to_oklch()),
            ColorValue::from_cmyk(color.to_cmyk()),
        ];
        for back in checks {
            prop_assert!(channel_drift(rgb, back.to_rgb()) <= 1);
        }
    }

    #[test]
    fn hex_parses_back(color in arb_color()) {
        prop_assert_eq!(ColorValue::parse(color.to_hex().as_str()).unwrap(), color.clone());
        prop_assert_eq!(ColorValue::parse(color.to_rgb_string().as_str()).unwrap(), color);
    }

    #[test]
    fn delta_e_identity(color in arb_color()) {
        prop_assert_eq!(delta_e_2000(&color, &color), 0.0);
        prop_assert_eq!(delta_e76(&color, &color), 0.0);
        prop_assert_eq!(delta_e_oklab(&color, &color), 0.0);
    }

    #[test]
    fn delta_e_symmetric_and_non_negative(a in arb_color(), b in arb_color()) {
        let ab = delta_e_2000(&a, &b);
        let ba = delta_e_2000(&b, &a);
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
        prop_assert!((delta_e76(&a, &b) - delta_e76(&b, &a)).abs() < 1e-9);
        prop_assert!((delta_e_oklab(&a, &b) - delta_e_oklab(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn contrast_bounded_and_symmetric(a in arb_color(), b in arb_color()) {
        let ratio = contrast_ratio(&a, &b);
        prop_assert!((1.0..=21.0 + 1e-9).contains(&ratio), "ratio {}", ratio);
        prop_assert!((ratio - contrast_ratio(&b, &a)).abs() < 1e-12);
        prop_assert_eq!(contrast_ratio(&a, &a), 1.0);
    }
}
