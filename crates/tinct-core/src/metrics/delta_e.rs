//! Perceptual color difference.
//!
//! - **CIEDE2000** (CIE 142-2001): the full weighting with lightness,
//!   chroma, and hue compensation plus the blue-region rotation term.
//! - **CIE76**: plain Euclidean distance in LAB.
//! - **OKLab**: Euclidean distance in OKLab, a cheap approximation that
//!   tracks ΔE00 monotonically for small differences.
//!
//! Rough ΔE00 thresholds: < 1 imperceptible, 1–2 close inspection,
//! 2–10 at a glance, > 10 distinct colors.

use crate::convert::spaces::{Lab, Oklab};
use crate::value::ColorValue;

/// 25⁷, the chroma normalizer used by the G and R_C terms.
const POW25_7: f64 = 6_103_515_625.0;

/// Parametric weights for CIEDE2000. `1.0` each for graphic arts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ciede2000Weights {
    pub k_l: f64,
    pub k_c: f64,
    pub k_h: f64,
}

impl Default for Ciede2000Weights {
    fn default() -> Self {
        Self {
            k_l: 1.0,
            k_c: 1.0,
            k_h: 1.0,
        }
    }
}

/// Hue angle of `(a, b)` in degrees `[0, 360)`, 0 at the origin.
fn hue_degrees(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 { h + 360.0 } else { h }
}

/// CIEDE2000 with default weights.
pub fn delta_e_2000_lab(lab1: Lab, lab2: Lab) -> f64 {
    delta_e_2000_weighted(lab1, lab2, Ciede2000Weights::default())
}

/// CIEDE2000 per Sharma, Wu & Dalal (2005).
///
/// # Algorithm
/// 1. Rescale `a*` by `1 + G` to correct neutral-axis chroma
/// 2. Compute ΔL′, ΔC′, ΔH′ on the rescaled values
/// 3. Weight by S_L, S_C, S_H around the mean L′, C′, h′
/// 4. Add the rotation term R_T for the blue region
pub fn delta_e_2000_weighted(lab1: Lab, lab2: Lab, weights: Ciede2000Weights) -> f64 {
    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let c_mean_pow7 = ((c1 + c2) * 0.5).powi(7);
    let g = 0.5 * (1.0 - (c_mean_pow7 / (c_mean_pow7 + POW25_7)).sqrt());

    let a1p = lab1.a * (1.0 + g);
    let a2p = lab2.a * (1.0 + g);
    let c1p = a1p.hypot(lab1.b);
    let c2p = a2p.hypot(lab2.b);
    let h1p = hue_degrees(a1p, lab1.b);
    let h2p = hue_degrees(a2p, lab2.b);

    let chroma_product = c1p * c2p;

    let dl = lab2.l - lab1.l;
    let dc = c2p - c1p;
    let dh_angle = if chroma_product == 0.0 {
        0.0
    } else {
        let d = h2p - h1p;
        if d > 180.0 {
            d - 360.0
        } else if d < -180.0 {
            d + 360.0
        } else {
            d
        }
    };
    let dh = 2.0 * chroma_product.sqrt() * (dh_angle.to_radians() * 0.5).sin();

    let l_mean = (lab1.l + lab2.l) * 0.5;
    let c_mean = (c1p + c2p) * 0.5;
    let h_mean = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) * 0.5
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) * 0.5
    } else {
        (h1p + h2p - 360.0) * 0.5
    };

    let t = 1.0 - 0.17 * (h_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_mean).to_radians().cos()
        + 0.32 * (3.0 * h_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_mean - 63.0).to_radians().cos();

    let d_theta = 30.0 * (-((h_mean - 275.0) / 25.0).powi(2)).exp();
    let c_mean_pow7 = c_mean.powi(7);
    let r_c = 2.0 * (c_mean_pow7 / (c_mean_pow7 + POW25_7)).sqrt();
    let r_t = -(2.0 * d_theta).to_radians().sin() * r_c;

    let l_offset_sq = (l_mean - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * l_offset_sq / (20.0 + l_offset_sq).sqrt();
    let s_c = 1.0 + 0.045 * c_mean;
    let s_h = 1.0 + 0.015 * c_mean * t;

    let tl = dl / (weights.k_l * s_l);
    let tc = dc / (weights.k_c * s_c);
    let th = dh / (weights.k_h * s_h);

    (tl * tl + tc * tc + th * th + r_t * tc * th).max(0.0).sqrt()
}

/// CIE76: Euclidean distance in LAB.
pub fn delta_e76_lab(lab1: Lab, lab2: Lab) -> f64 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Euclidean distance in OKLab.
pub fn delta_e_oklab_lab(lab1: Oklab, lab2: Oklab) -> f64 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// CIEDE2000 between two colors.
pub fn delta_e_2000(a: &ColorValue, b: &ColorValue) -> f64 {
    delta_e_2000_lab(a.to_lab(), b.to_lab())
}

/// CIE76 between two colors.
pub fn delta_e76(a: &ColorValue, b: &ColorValue) -> f64 {
    delta_e76_lab(a.to_lab(), b.to_lab())
}

/// OKLab distance between two colors.
pub fn delta_e_oklab(a: &ColorValue, b: &ColorValue) -> f64 {
    delta_e_oklab_lab(a.to_oklab(), b.to_oklab())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_identity_is_zero() {
        let lab = Lab::new(60.2574, -34.0099, 36.2677);
        assert_eq!(delta_e_2000_lab(lab, lab), 0.0);
        assert_eq!(delta_e76_lab(lab, lab), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = Lab::new(50.0, 2.5, 0.0);
        let b = Lab::new(73.0, 25.0, -18.0);
        assert!((delta_e_2000_lab(a, b) - delta_e_2000_lab(b, a)).abs() < EPSILON);
    }

    #[test]
    fn test_sharma_reference_pairs() {
        // Selected rows from Sharma, Wu & Dalal (2005), Table 1.
        let cases = [
            ((50.0, 2.6772, -79.7751), (50.0, 0.0, -82.7485), 2.0425),
            ((50.0, 0.0, 0.0), (50.0, -1.0, 2.0), 2.3669),
            ((50.0, 2.49, -0.001), (50.0, -2.49, 0.0009), 7.1792),
            ((50.0, 2.49, -0.001), (50.0, -2.49, 0.0011), 7.2195),
            ((50.0, 2.5, 0.0), (73.0, 25.0, -18.0), 27.1492),
            ((60.2574, -34.0099, 36.2677), (60.4626, -34.1751, 39.4387), 1.2644),
            ((2.0776, 0.0795, -1.135), (0.9033, -0.0636, -0.5514), 0.9082),
        ];
        for ((l1, a1, b1), (l2, a2, b2), expected) in cases {
            let de = delta_e_2000_lab(Lab::new(l1, a1, b1), Lab::new(l2, a2, b2));
            assert!((de - expected).abs() < 1e-4, "expected {expected}, got {de}");
        }
    }

    #[test]
    fn test_cie76_is_euclidean() {
        let de = delta_e76_lab(Lab::new(50.0, 0.0, 0.0), Lab::new(53.0, 4.0, 0.0));
        assert!((de - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_weights_scale_lightness_term() {
        let a = Lab::new(50.0, 0.0, 0.0);
        let b = Lab::new(60.0, 0.0, 0.0);
        let textile = Ciede2000Weights {
            k_l: 2.0,
            ..Default::default()
        };
        assert!(delta_e_2000_weighted(a, b, textile) < delta_e_2000_lab(a, b));
    }

    #[test]
    fn test_oklab_distance_orders_like_ciede2000() {
        let base = ColorValue::from_rgb(200, 50, 50);
        let near = ColorValue::from_rgb(205, 55, 50);
        let far = ColorValue::from_rgb(50, 50, 200);
        assert!(delta_e_oklab(&base, &near) < delta_e_oklab(&base, &far));
        assert!(delta_e_2000(&base, &near) < delta_e_2000(&base, &far));
        assert_eq!(delta_e_oklab(&base, &base), 0.0);
    }
}
