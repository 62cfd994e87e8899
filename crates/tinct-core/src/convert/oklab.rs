//! OKLab and OKLCh (Björn Ottosson, 2020).
//!
//! ```text
//! RGB ──linearize──→ linear sRGB ──M1──→ LMS ──∛──→ LMS′ ──M2──→ OKLab ──polar──→ OKLCh
//! ```
//!
//! The inverse runs each step backwards: M2⁻¹, cube, M1⁻¹, re-encode.

use super::matrix::{LINEAR_SRGB_TO_LMS, LMS_PRIME_TO_OKLAB, LMS_TO_LINEAR_SRGB, OKLAB_TO_LMS_PRIME};
use super::spaces::{Oklab, Oklch, Rgb, normalize_hue};
use super::transfer::{delinearize_rgb, linearize_rgb};

/// Chroma below this has no meaningful hue angle.
///
/// The published M2 rows sum to 3.7e-8 rather than zero, so grays carry
/// a tiny residual `b`.
pub const OKLCH_ACHROMATIC_EPSILON: f64 = 1e-6;

/// Linear sRGB → OKLab.
pub fn linear_to_oklab(linear: [f64; 3]) -> Oklab {
    let lms = LINEAR_SRGB_TO_LMS.apply(linear);
    let [l, a, b] = LMS_PRIME_TO_OKLAB.apply(lms.map(f64::cbrt));
    Oklab::new(l, a, b)
}

/// OKLab → linear sRGB, unclamped.
pub fn oklab_to_linear(lab: Oklab) -> [f64; 3] {
    let lms_prime = OKLAB_TO_LMS_PRIME.apply([lab.l, lab.a, lab.b]);
    LMS_TO_LINEAR_SRGB.apply(lms_prime.map(|c| c * c * c))
}

pub fn unit_to_oklab(rgb: [f64; 3]) -> Oklab {
    linear_to_oklab(linearize_rgb(rgb))
}

pub fn oklab_to_unit(lab: Oklab) -> [f64; 3] {
    delinearize_rgb(oklab_to_linear(lab))
}

pub fn oklab_to_oklch(lab: Oklab) -> Oklch {
    let c = lab.a.hypot(lab.b);
    let h = if c < OKLCH_ACHROMATIC_EPSILON {
        0.0
    } else {
        normalize_hue(lab.b.atan2(lab.a).to_degrees())
    };
    Oklch::new(lab.l, c, h)
}

pub fn oklch_to_oklab(lch: Oklch) -> Oklab {
    let c = lch.c.max(0.0);
    let h = lch.h.to_radians();
    Oklab::new(lch.l, c * h.cos(), c * h.sin())
}

pub fn rgb_to_oklab(rgb: Rgb) -> Oklab {
    unit_to_oklab(rgb.to_unit())
}

pub fn oklab_to_rgb(lab: Oklab) -> Rgb {
    Rgb::from_unit(oklab_to_unit(lab), 1.0)
}

pub fn rgb_to_oklch(rgb: Rgb) -> Oklch {
    oklab_to_oklch(rgb_to_oklab(rgb))
}

pub fn oklch_to_rgb(lch: Oklch) -> Rgb {
    oklab_to_rgb(oklch_to_oklab(lch))
}
