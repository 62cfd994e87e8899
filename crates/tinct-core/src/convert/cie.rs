//! CIE XYZ, CIELAB, and CIELCh under the D65 illuminant.
//!
//! # Reference
//! - IEC 61966-2-1 (sRGB primaries and companding)
//! - CIE 15:2004 (LAB with the κ/ε linear segment near black)
//!
//! ```text
//! RGB ──linearize──→ linear sRGB ──M──→ XYZ ──f(t)──→ LAB ──polar──→ LCH
//! ```

use super::matrix::{LINEAR_SRGB_TO_XYZ, XYZ_TO_LINEAR_SRGB};
use super::spaces::{Lab, Lch, Rgb, Xyz, normalize_hue};
use super::transfer::{delinearize_rgb, linearize_rgb};

/// D65 reference white, `Y` scaled to 100.
pub const D65_WHITE: Xyz = Xyz::new(95.047, 100.0, 108.883);

/// κ = 24389/27, the slope of the linear segment.
const KAPPA: f64 = 24389.0 / 27.0;
/// ε = 216/24389, the cube of 6/29 where the two segments meet.
const EPSILON: f64 = 216.0 / 24389.0;

/// Chroma below this has no meaningful hue angle.
///
/// The published matrix maps sRGB white to `Y = 100.00001`, which leaves
/// grays with a residual chroma around 1e-5. The closest distinct 8-bit
/// colors are several orders of magnitude further apart.
pub const LCH_ACHROMATIC_EPSILON: f64 = 1e-4;

/// Unit sRGB → XYZ (`Y` of white = 100).
pub fn unit_to_xyz(rgb: [f64; 3]) -> Xyz {
    let [x, y, z] = LINEAR_SRGB_TO_XYZ.apply(linearize_rgb(rgb));
    Xyz::new(x * 100.0, y * 100.0, z * 100.0)
}

/// XYZ → unit sRGB, unclamped (may leave gamut).
pub fn xyz_to_unit(xyz: Xyz) -> [f64; 3] {
    let linear = XYZ_TO_LINEAR_SRGB.apply([xyz.x / 100.0, xyz.y / 100.0, xyz.z / 100.0]);
    delinearize_rgb(linear)
}

pub fn rgb_to_xyz(rgb: Rgb) -> Xyz {
    unit_to_xyz(rgb.to_unit())
}

pub fn xyz_to_rgb(xyz: Xyz) -> Rgb {
    Rgb::from_unit(xyz_to_unit(xyz), 1.0)
}

fn lab_f(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cubed = f * f * f;
    if cubed > EPSILON {
        cubed
    } else {
        (116.0 * f - 16.0) / KAPPA
    }
}

pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let fx = lab_f(xyz.x / D65_WHITE.x);
    let fy = lab_f(xyz.y / D65_WHITE.y);
    let fz = lab_f(xyz.z / D65_WHITE.z);
    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

pub fn lab_to_xyz(lab: Lab) -> Xyz {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    // Lightness uses its own branch so that L ≤ 8 stays on the linear segment.
    let yr = if lab.l > KAPPA * EPSILON {
        fy * fy * fy
    } else {
        lab.l / KAPPA
    };

    Xyz::new(
        lab_f_inv(fx) * D65_WHITE.x,
        yr * D65_WHITE.y,
        lab_f_inv(fz) * D65_WHITE.z,
    )
}

pub fn lab_to_lch(lab: Lab) -> Lch {
    let c = lab.a.hypot(lab.b);
    let h = if c < LCH_ACHROMATIC_EPSILON {
        0.0
    } else {
        normalize_hue(lab.b.atan2(lab.a).to_degrees())
    };
    Lch::new(lab.l, c, h)
}

pub fn lch_to_lab(lch: Lch) -> Lab {
    let c = lch.c.max(0.0);
    let h = lch.h.to_radians();
    Lab::new(lch.l, c * h.cos(), c * h.sin())
}

pub fn unit_to_lab(rgb: [f64; 3]) -> Lab {
    xyz_to_lab(unit_to_xyz(rgb))
}

pub fn lab_to_unit(lab: Lab) -> [f64; 3] {
    xyz_to_unit(lab_to_xyz(lab))
}

pub fn rgb_to_lab(rgb: Rgb) -> Lab {
    unit_to_lab(rgb.to_unit())
}

pub fn lab_to_rgb(lab: Lab) -> Rgb {
    Rgb::from_unit(lab_to_unit(lab), 1.0)
}

pub fn rgb_to_lch(rgb: Rgb) -> Lch {
    lab_to_lch(rgb_to_lab(rgb))
}

pub fn lch_to_rgb(lch: Lch) -> Rgb {
    lab_to_rgb(lch_to_lab(lch))
}
