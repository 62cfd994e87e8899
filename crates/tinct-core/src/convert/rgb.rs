//! Piecewise-linear RGB models: HSL, HSV, HWB, and CMYK.
//!
//! All four share the min/max/chroma decomposition of the gamma-encoded
//! channels. Achromatic colors (chroma below [`ACHROMATIC_EPSILON`]) get
//! hue 0 rather than NaN.

use super::spaces::{Cmyk, Hsl, Hsv, Hwb, Rgb, normalize_hue};

/// Chroma below this is treated as gray.
pub const ACHROMATIC_EPSILON: f64 = 1e-10;

/// Hue in degrees from unit RGB and its precomputed max and chroma.
fn hue_of(rgb: [f64; 3], max: f64, delta: f64) -> f64 {
    if delta < ACHROMATIC_EPSILON {
        return 0.0;
    }
    let [r, g, b] = rgb;
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    normalize_hue(sector * 60.0)
}

fn min_max(rgb: [f64; 3]) -> (f64, f64) {
    let [r, g, b] = rgb;
    (r.min(g).min(b), r.max(g).max(b))
}

/// Unit RGB → HSL with `s`, `l` in `[0, 100]`.
pub fn unit_to_hsl(rgb: [f64; 3]) -> Hsl {
    let (min, max) = min_max(rgb);
    let delta = max - min;
    let l = (max + min) * 0.5;

    if delta < ACHROMATIC_EPSILON {
        return Hsl::new(0.0, 0.0, l * 100.0);
    }

    let s = delta / (1.0 - (2.0 * l - 1.0).abs());
    Hsl::new(hue_of(rgb, max, delta), s.min(1.0) * 100.0, l * 100.0)
}

/// HSL → unit RGB. Out-of-range input is normalized first.
pub fn hsl_to_unit(hsl: Hsl) -> [f64; 3] {
    let Hsl { h, s, l } = hsl.normalized();
    let s = s / 100.0;
    let l = l / 100.0;

    if s < ACHROMATIC_EPSILON {
        return [l, l, l];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    unit_to_hsl(rgb.to_unit())
}

pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    Rgb::from_unit(hsl_to_unit(hsl), 1.0)
}

/// Unit RGB → HSV with `s`, `v` in `[0, 100]`.
pub fn unit_to_hsv(rgb: [f64; 3]) -> Hsv {
    let (min, max) = min_max(rgb);
    let delta = max - min;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    Hsv::new(hue_of(rgb, max, delta), s * 100.0, max * 100.0)
}

/// HSV → unit RGB via the six-sector chroma construction.
pub fn hsv_to_unit(hsv: Hsv) -> [f64; 3] {
    let Hsv { h, s, v } = hsv.normalized();
    let s = s / 100.0;
    let v = v / 100.0;

    let c = v * s;
    let sector = h / 60.0;
    let x = c * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match sector as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    unit_to_hsv(rgb.to_unit())
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    Rgb::from_unit(hsv_to_unit(hsv), 1.0)
}

/// Unit RGB → HWB: whiteness is the minimum, blackness `1 − max`.
pub fn unit_to_hwb(rgb: [f64; 3]) -> Hwb {
    let (min, max) = min_max(rgb);
    Hwb::new(hue_of(rgb, max, max - min), min * 100.0, (1.0 - max) * 100.0)
}

/// HWB → unit RGB. When `w + b ≥ 100` the result is the gray `w / (w + b)`.
pub fn hwb_to_unit(hwb: Hwb) -> [f64; 3] {
    let Hwb { h, w, b } = hwb.normalized();
    let w = w / 100.0;
    let b = b / 100.0;

    if w + b >= 1.0 {
        let gray = w / (w + b);
        return [gray, gray, gray];
    }

    let v = 1.0 - b;
    let s = if v > 0.0 { 1.0 - w / v } else { 0.0 };
    hsv_to_unit(Hsv::new(h, s * 100.0, v * 100.0))
}

pub fn rgb_to_hwb(rgb: Rgb) -> Hwb {
    unit_to_hwb(rgb.to_unit())
}

pub fn hwb_to_rgb(hwb: Hwb) -> Rgb {
    Rgb::from_unit(hwb_to_unit(hwb), 1.0)
}

/// Unit RGB → CMYK with the naive subtractive model.
///
/// Pure black has `k = 100` and `c = m = y = 0`; the `1 − k` divisor is
/// never evaluated at zero.
pub fn unit_to_cmyk(rgb: [f64; 3]) -> Cmyk {
    let (_, max) = min_max(rgb);
    let k = 1.0 - max;
    if max < ACHROMATIC_EPSILON {
        return Cmyk::new(0.0, 0.0, 0.0, 100.0);
    }
    let [r, g, b] = rgb;
    Cmyk::new(
        (1.0 - r - k) / max * 100.0,
        (1.0 - g - k) / max * 100.0,
        (1.0 - b - k) / max * 100.0,
        k * 100.0,
    )
}

pub fn cmyk_to_unit(cmyk: Cmyk) -> [f64; 3] {
    let Cmyk { c, m, y, k } = cmyk.normalized();
    let white = 1.0 - k / 100.0;
    [
        (1.0 - c / 100.0) * white,
        (1.0 - m / 100.0) * white,
        (1.0 - y / 100.0) * white,
    ]
}

pub fn rgb_to_cmyk(rgb: Rgb) -> Cmyk {
    unit_to_cmyk(rgb.to_unit())
}

pub fn cmyk_to_rgb(cmyk: Cmyk) -> Rgb {
    Rgb::from_unit(cmyk_to_unit(cmyk), 1.0)
}
