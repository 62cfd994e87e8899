//! Per-space color records.
//!
//! Plain value types with no identity. Ranges follow the CSS conventions
//! used throughout the toolkit: percentages in `[0, 100]`, hue in degrees
//! `[0, 360)`, XYZ scaled so that the D65 white has `Y = 100`.

use serde::{Deserialize, Serialize};

use super::ColorSpace;
use crate::error::RangeWarning;

/// Wrap a hue angle into `[0, 360)`.
///
/// `rem_euclid` can return exactly `360.0` for tiny negative inputs, which
/// would break the half-open range.
pub fn normalize_hue(h: f64) -> f64 {
    if !h.is_finite() {
        return 0.0;
    }
    let wrapped = h.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

/// 8-bit sRGB with a floating alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Opaque color from 8-bit channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from 8-bit channels and an alpha, clamping alpha into `[0, 1]`.
    pub fn with_alpha(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: clamp_alpha(a),
        }
    }

    /// Channels as floats in `[0, 1]`, alpha dropped.
    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    /// Quantize unit-range floats back to 8-bit, clamping out-of-gamut values.
    pub fn from_unit(rgb: [f64; 3], a: f64) -> Self {
        Self::with_alpha(quantize(rgb[0]), quantize(rgb[1]), quantize(rgb[2]), a)
    }

    /// Packed `0xRRGGBB`, alpha dropped.
    pub fn to_u24(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Clamp an alpha into `[0, 1]`; NaN reads as fully opaque.
pub fn clamp_alpha(a: f64) -> f64 {
    if a.is_nan() { 1.0 } else { a.clamp(0.0, 1.0) }
}

/// Round a unit-range float to the nearest 8-bit level.
pub fn quantize(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Hue, saturation, lightness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Report the first channel outside its nominal range.
    pub fn check(&self) -> Result<(), RangeWarning> {
        check_hue(ColorSpace::Hsl, self.h)?;
        RangeWarning::check(ColorSpace::Hsl, "s", self.s, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Hsl, "l", self.l, 0.0, 100.0)
    }

    /// Wrap hue and clamp saturation/lightness.
    pub fn normalized(self) -> Self {
        Self {
            h: normalize_hue(self.h),
            s: clamp_percent(self.s),
            l: clamp_percent(self.l),
        }
    }
}

/// Hue, saturation, value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    pub fn check(&self) -> Result<(), RangeWarning> {
        check_hue(ColorSpace::Hsv, self.h)?;
        RangeWarning::check(ColorSpace::Hsv, "s", self.s, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Hsv, "v", self.v, 0.0, 100.0)
    }

    pub fn normalized(self) -> Self {
        Self {
            h: normalize_hue(self.h),
            s: clamp_percent(self.s),
            v: clamp_percent(self.v),
        }
    }
}

/// Hue, whiteness, blackness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hwb {
    pub h: f64,
    pub w: f64,
    pub b: f64,
}

impl Hwb {
    pub const fn new(h: f64, w: f64, b: f64) -> Self {
        Self { h, w, b }
    }

    pub fn check(&self) -> Result<(), RangeWarning> {
        check_hue(ColorSpace::Hwb, self.h)?;
        RangeWarning::check(ColorSpace::Hwb, "w", self.w, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Hwb, "b", self.b, 0.0, 100.0)
    }

    pub fn normalized(self) -> Self {
        Self {
            h: normalize_hue(self.h),
            w: clamp_percent(self.w),
            b: clamp_percent(self.b),
        }
    }
}

/// CIE 1931 tristimulus values under D65, white at `Y = 100`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// XYZ is unbounded; only negative or non-finite values are flagged.
    pub fn check(&self) -> Result<(), RangeWarning> {
        RangeWarning::check(ColorSpace::Xyz, "x", self.x, 0.0, f64::MAX)?;
        RangeWarning::check(ColorSpace::Xyz, "y", self.y, 0.0, f64::MAX)?;
        RangeWarning::check(ColorSpace::Xyz, "z", self.z, 0.0, f64::MAX)
    }
}

/// CIELAB under D65.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Only lightness has a hard range; `a`/`b` are open-ended.
    pub fn check(&self) -> Result<(), RangeWarning> {
        RangeWarning::check(ColorSpace::Lab, "l", self.l, 0.0, 100.0)
    }
}

/// Polar CIELAB: lightness, chroma, hue.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Lch {
    pub const fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    pub fn check(&self) -> Result<(), RangeWarning> {
        RangeWarning::check(ColorSpace::Lch, "l", self.l, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Lch, "c", self.c, 0.0, f64::MAX)?;
        check_hue(ColorSpace::Lch, self.h)
    }
}

/// Björn Ottosson's OKLab.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Oklab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Oklab {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    pub fn check(&self) -> Result<(), RangeWarning> {
        RangeWarning::check(ColorSpace::Oklab, "l", self.l, 0.0, 1.0)
    }
}

/// Polar OKLab.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Oklch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

impl Oklch {
    pub const fn new(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    pub fn check(&self) -> Result<(), RangeWarning> {
        RangeWarning::check(ColorSpace::Oklch, "l", self.l, 0.0, 1.0)?;
        RangeWarning::check(ColorSpace::Oklch, "c", self.c, 0.0, f64::MAX)?;
        check_hue(ColorSpace::Oklch, self.h)
    }
}

/// Subtractive process color, all channels in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cmyk {
    pub c: f64,
    pub m: f64,
    pub y: f64,
    pub k: f64,
}

impl Cmyk {
    pub const fn new(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self { c, m, y, k }
    }

    pub fn check(&self) -> Result<(), RangeWarning> {
        RangeWarning::check(ColorSpace::Cmyk, "c", self.c, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Cmyk, "m", self.m, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Cmyk, "y", self.y, 0.0, 100.0)?;
        RangeWarning::check(ColorSpace::Cmyk, "k", self.k, 0.0, 100.0)
    }

    pub fn normalized(self) -> Self {
        Self {
            c: clamp_percent(self.c),
            m: clamp_percent(self.m),
            y: clamp_percent(self.y),
            k: clamp_percent(self.k),
        }
    }
}

fn check_hue(space: ColorSpace, h: f64) -> Result<(), RangeWarning> {
    if (0.0..360.0).contains(&h) {
        Ok(())
    } else {
        Err(RangeWarning {
            space,
            channel: "h",
            value: h,
            min: 0.0,
            max: 360.0,
        })
    }
}
