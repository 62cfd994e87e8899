//! `ColorValue`: the immutable color type every higher layer consumes.
//!
//! Canonical storage is 8-bit sRGB plus a float alpha. Every other space is
//! derived on demand and memoized per instance; nothing is shared between
//! instances and no projection is ever treated as a source of truth.

pub mod named;
mod parse;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::convert::cie::{lab_to_lch, lab_to_unit, unit_to_lab, xyz_to_lab};
use crate::convert::oklab::{
    OKLCH_ACHROMATIC_EPSILON, oklab_to_oklch, oklab_to_unit, oklch_to_oklab, unit_to_oklab,
};
use crate::convert::rgb::{ACHROMATIC_EPSILON, hsl_to_unit, unit_to_hsl};
use crate::convert::spaces::{
    Cmyk, Hsl, Hsv, Hwb, Lab, Lch, Oklab, Oklch, Rgb, Xyz, clamp_alpha, normalize_hue, quantize,
};
use crate::convert::transfer::{delinearize_rgb, linearize_rgb};
use crate::convert::{self, ColorSpace, Projection};
use crate::error::ParseError;

/// Anything [`ColorValue::parse`] accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorInput<'a> {
    /// Hex, functional, named, or `0x` literal.
    Text(&'a str),
    /// `0xRRGGBB`, or `0xRRGGBBAA` when above `0xFFFFFF`.
    Integer(u64),
    /// A record in any supported space.
    Record(Projection),
}

impl<'a> From<&'a str> for ColorInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for ColorInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl From<u32> for ColorInput<'_> {
    fn from(value: u32) -> Self {
        Self::Integer(u64::from(value))
    }
}

impl From<u64> for ColorInput<'_> {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<Projection> for ColorInput<'_> {
    fn from(value: Projection) -> Self {
        Self::Record(value)
    }
}

impl From<Rgb> for ColorInput<'_> {
    fn from(value: Rgb) -> Self {
        Self::Record(Projection::Rgb(value))
    }
}

/// Interpolation space for [`ColorValue::mix_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixSpace {
    /// Gamma-encoded sRGB, the CSS default.
    #[default]
    Rgb,
    LinearRgb,
    Hsl,
    Lab,
    Oklab,
    Oklch,
}

#[derive(Clone, Default)]
struct Memo {
    hsl: OnceLock<Hsl>,
    hsv: OnceLock<Hsv>,
    hwb: OnceLock<Hwb>,
    xyz: OnceLock<Xyz>,
    lab: OnceLock<Lab>,
    lch: OnceLock<Lch>,
    oklab: OnceLock<Oklab>,
    oklch: OnceLock<Oklch>,
    cmyk: OnceLock<Cmyk>,
}

/// An immutable sRGB color with lazily computed projections.
///
/// Equality and hashing look only at the canonical RGBA channels.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorValue {
    rgb: Rgb,
    memo: Memo,
}

impl ColorValue {
    /// Wrap a canonical record. Alpha is clamped here and never again.
    pub fn new(rgb: Rgb) -> Self {
        // `+ 0.0` folds -0.0 so bitwise hashing agrees with equality.
        let a = clamp_alpha(rgb.a) + 0.0;
        Self {
            rgb: Rgb { a, ..rgb },
            memo: Memo::default(),
        }
    }

    /// Parse text, an integer, or a record. Out-of-range numeric components
    /// are clamped.
    pub fn parse<'a>(input: impl Into<ColorInput<'a>>) -> Result<Self, ParseError> {
        Self::parse_with(input, false)
    }

    /// Like [`parse`](Self::parse), but `strict` turns out-of-range
    /// components into `ParseErrorKind::OutOfRange` instead of clamping.
    pub fn parse_with<'a>(input: impl Into<ColorInput<'a>>, strict: bool) -> Result<Self, ParseError> {
        let rgb = match input.into() {
            ColorInput::Text(text) => parse::parse_str(text, strict)?,
            ColorInput::Integer(value) => parse::parse_integer(value)?,
            ColorInput::Record(record) => {
                if strict {
                    record
                        .check()
                        .map_err(|w| ParseError::new(w.into(), format!("{record:?}")))?;
                }
                let rgb = convert::unproject(&record);
                match record {
                    Projection::Rgb(source) => Rgb { a: source.a, ..rgb },
                    _ => rgb,
                }
            }
        };
        Ok(Self::new(rgb))
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(Rgb::new(r, g, b))
    }

    pub fn from_rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::new(Rgb::with_alpha(r, g, b, a))
    }

    /// `0xRRGGBB`; the top byte is ignored.
    pub fn from_rgb24(value: u32) -> Self {
        Self::new(parse::rgb24(value))
    }

    /// `0xRRGGBBAA`.
    pub fn from_rgba32(value: u32) -> Self {
        Self::new(parse::rgba32(value))
    }

    /// 24-bit when `value <= 0xFFFFFF`, otherwise 32-bit with alpha.
    pub fn from_u32(value: u32) -> Self {
        if value > 0x00FF_FFFF {
            Self::from_rgba32(value)
        } else {
            Self::from_rgb24(value)
        }
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        Self::new(convert::hsl_to_rgb(hsl))
    }

    pub fn from_hsv(hsv: Hsv) -> Self {
        Self::new(convert::hsv_to_rgb(hsv))
    }

    pub fn from_hwb(hwb: Hwb) -> Self {
        Self::new(convert::hwb_to_rgb(hwb))
    }

    pub fn from_xyz(xyz: Xyz) -> Self {
        Self::new(convert::xyz_to_rgb(xyz))
    }

    pub fn from_lab(lab: Lab) -> Self {
        Self::new(convert::lab_to_rgb(lab))
    }

    pub fn from_lch(lch: Lch) -> Self {
        Self::new(convert::lch_to_rgb(lch))
    }

    pub fn from_oklab(lab: Oklab) -> Self {
        Self::new(convert::oklab_to_rgb(lab))
    }

    pub fn from_oklch(lch: Oklch) -> Self {
        Self::new(convert::oklch_to_rgb(lch))
    }

    pub fn from_cmyk(cmyk: Cmyk) -> Self {
        Self::new(convert::cmyk_to_rgb(cmyk))
    }

    // --- Accessors ---------------------------------------------------------

    pub fn to_rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn alpha(&self) -> f64 {
        self.rgb.a
    }

    pub fn to_hsl(&self) -> Hsl {
        *self.memo.hsl.get_or_init(|| convert::rgb_to_hsl(self.rgb))
    }

    pub fn to_hsv(&self) -> Hsv {
        *self.memo.hsv.get_or_init(|| convert::rgb_to_hsv(self.rgb))
    }

    pub fn to_hwb(&self) -> Hwb {
        *self.memo.hwb.get_or_init(|| convert::rgb_to_hwb(self.rgb))
    }

    pub fn to_xyz(&self) -> Xyz {
        *self.memo.xyz.get_or_init(|| convert::rgb_to_xyz(self.rgb))
    }

    pub fn to_lab(&self) -> Lab {
        *self.memo.lab.get_or_init(|| xyz_to_lab(self.to_xyz()))
    }

    pub fn to_lch(&self) -> Lch {
        *self.memo.lch.get_or_init(|| lab_to_lch(self.to_lab()))
    }

    pub fn to_oklab(&self) -> Oklab {
        *self.memo.oklab.get_or_init(|| convert::rgb_to_oklab(self.rgb))
    }

    pub fn to_oklch(&self) -> Oklch {
        *self.memo.oklch.get_or_init(|| oklab_to_oklch(self.to_oklab()))
    }

    pub fn to_cmyk(&self) -> Cmyk {
        *self.memo.cmyk.get_or_init(|| convert::rgb_to_cmyk(self.rgb))
    }

    /// This color in `space`, served from the per-instance memo.
    pub fn project(&self, space: ColorSpace) -> Projection {
        match space {
            ColorSpace::Rgb => Projection::Rgb(self.rgb),
            ColorSpace::Hsl => Projection::Hsl(self.to_hsl()),
            ColorSpace::Hsv => Projection::Hsv(self.to_hsv()),
            ColorSpace::Hwb => Projection::Hwb(self.to_hwb()),
            ColorSpace::Xyz => Projection::Xyz(self.to_xyz()),
            ColorSpace::Lab => Projection::Lab(self.to_lab()),
            ColorSpace::Lch => Projection::Lch(self.to_lch()),
            ColorSpace::Oklab => Projection::Oklab(self.to_oklab()),
            ColorSpace::Oklch => Projection::Oklch(self.to_oklch()),
            ColorSpace::Cmyk => Projection::Cmyk(self.to_cmyk()),
        }
    }

    // --- Output formats ----------------------------------------------------

    /// `#rrggbb`.
    pub fn to_hex(&self) -> String {
        self.to_hex_with(false, false)
    }

    /// `#rrggbb` or `#rrggbbaa`, optionally uppercase.
    pub fn to_hex_with(&self, include_alpha: bool, uppercase: bool) -> String {
        let Rgb { r, g, b, a } = self.rgb;
        match (include_alpha, uppercase) {
            (false, false) => format!("#{r:02x}{g:02x}{b:02x}"),
            (false, true) => format!("#{r:02X}{g:02X}{b:02X}"),
            (true, false) => format!("#{r:02x}{g:02x}{b:02x}{:02x}", quantize(a)),
            (true, true) => format!("#{r:02X}{g:02X}{b:02X}{:02X}", quantize(a)),
        }
    }

    /// `rgb(r, g, b)`, or `rgba(r, g, b, a)` when translucent.
    pub fn to_rgb_string(&self) -> String {
        let Rgb { r, g, b, a } = self.rgb;
        if a < 1.0 {
            format!("rgba({r}, {g}, {b}, {})", round_alpha(a))
        } else {
            format!("rgb({r}, {g}, {b})")
        }
    }

    /// `hsl(h, s%, l%)`, or `hsla(…)` when translucent. Channels are rounded.
    pub fn to_hsl_string(&self) -> String {
        let hsl = self.to_hsl();
        let (h, s, l) = (hsl.h.round() % 360.0, hsl.s.round(), hsl.l.round());
        if self.rgb.a < 1.0 {
            format!("hsla({h}, {s}%, {l}%, {})", round_alpha(self.rgb.a))
        } else {
            format!("hsl({h}, {s}%, {l}%)")
        }
    }

    /// The CSS name for this exact color, if it has one.
    pub fn to_name(&self) -> Option<&'static str> {
        let Rgb { r, g, b, a } = self.rgb;
        if a == 0.0 && (r, g, b) == (0, 0, 0) {
            return Some("transparent");
        }
        if a < 1.0 {
            return None;
        }
        named::name_of([r, g, b])
    }

    // --- Adjustments -------------------------------------------------------

    fn map_hsl(&self, f: impl FnOnce(Hsl) -> Hsl) -> Self {
        let rgb = Rgb::from_unit(hsl_to_unit(f(self.to_hsl())), self.rgb.a);
        Self::new(rgb)
    }

    /// Raise HSL lightness by `amount` percentage points.
    pub fn lighten(&self, amount: f64) -> Self {
        self.map_hsl(|hsl| Hsl { l: hsl.l + amount, ..hsl })
    }

    pub fn darken(&self, amount: f64) -> Self {
        self.lighten(-amount)
    }

    /// Raise HSL saturation by `amount` percentage points.
    pub fn saturate(&self, amount: f64) -> Self {
        self.map_hsl(|hsl| Hsl { s: hsl.s + amount, ..hsl })
    }

    pub fn desaturate(&self, amount: f64) -> Self {
        self.saturate(-amount)
    }

    /// Rotate the hue by `degrees`.
    pub fn rotate(&self, degrees: f64) -> Self {
        self.map_hsl(|hsl| Hsl { h: hsl.h + degrees, ..hsl })
    }

    pub fn complement(&self) -> Self {
        self.rotate(180.0)
    }

    pub fn grayscale(&self) -> Self {
        self.map_hsl(|hsl| Hsl { s: 0.0, ..hsl })
    }

    pub fn invert(&self) -> Self {
        let Rgb { r, g, b, a } = self.rgb;
        Self::new(Rgb::with_alpha(255 - r, 255 - g, 255 - b, a))
    }

    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self::new(Rgb { a: alpha, ..self.rgb })
    }

    /// Blend toward `other` in gamma-encoded sRGB. `weight` is the share of
    /// `other`, clamped to `[0, 1]`.
    pub fn mix(&self, other: &Self, weight: f64) -> Self {
        self.mix_in(other, weight, MixSpace::Rgb)
    }

    /// Blend toward `other` in `space`. Cylindrical spaces take the shorter
    /// arc, and an achromatic endpoint adopts the other endpoint's hue.
    pub fn mix_in(&self, other: &Self, weight: f64, space: MixSpace) -> Self {
        let t = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        let alpha = lerp(self.rgb.a, other.rgb.a, t);
        let (from, to) = (self.rgb.to_unit(), other.rgb.to_unit());

        let unit = match space {
            MixSpace::Rgb => lerp3(from, to, t),
            MixSpace::LinearRgb => {
                delinearize_rgb(lerp3(linearize_rgb(from), linearize_rgb(to), t))
            }
            MixSpace::Hsl => {
                let (a, b) = (unit_to_hsl(from), unit_to_hsl(to));
                let (ha, hb) = pair_hues(a.h, a.s, b.h, b.s, ACHROMATIC_EPSILON);
                hsl_to_unit(Hsl::new(lerp_hue(ha, hb, t), lerp(a.s, b.s, t), lerp(a.l, b.l, t)))
            }
            MixSpace::Lab => {
                let (a, b) = (unit_to_lab(from), unit_to_lab(to));
                lab_to_unit(Lab::new(lerp(a.l, b.l, t), lerp(a.a, b.a, t), lerp(a.b, b.b, t)))
            }
            MixSpace::Oklab => {
                let (a, b) = (unit_to_oklab(from), unit_to_oklab(to));
                oklab_to_unit(Oklab::new(lerp(a.l, b.l, t), lerp(a.a, b.a, t), lerp(a.b, b.b, t)))
            }
            MixSpace::Oklch => {
                let (a, b) = (oklab_to_oklch(unit_to_oklab(from)), oklab_to_oklch(unit_to_oklab(to)));
                let (ha, hb) = pair_hues(a.h, a.c, b.h, b.c, OKLCH_ACHROMATIC_EPSILON);
                let lch = Oklch::new(lerp(a.l, b.l, t), lerp(a.c, b.c, t), lerp_hue(ha, hb, t));
                oklab_to_unit(oklch_to_oklab(lch))
            }
        };
        Self::new(Rgb::from_unit(unit, alpha))
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp3(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Interpolate along the shorter arc.
fn lerp_hue(from: f64, to: f64, t: f64) -> f64 {
    let delta = (to - from + 540.0).rem_euclid(360.0) - 180.0;
    normalize_hue(from + delta * t)
}

/// Achromatic endpoints borrow the other endpoint's hue.
fn pair_hues(ha: f64, ca: f64, hb: f64, cb: f64, epsilon: f64) -> (f64, f64) {
    match (ca < epsilon, cb < epsilon) {
        (true, false) => (hb, hb),
        (false, true) => (ha, ha),
        _ => (ha, hb),
    }
}

/// Three decimals, trailing zeros dropped by `f64`'s `Display`.
fn round_alpha(a: f64) -> f64 {
    (a * 1000.0).round() / 1000.0
}

impl PartialEq for ColorValue {
    fn eq(&self, other: &Self) -> bool {
        self.rgb == other.rgb
    }
}

impl Eq for ColorValue {}

impl Hash for ColorValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let Rgb { r, g, b, a } = self.rgb;
        (r, g, b, a.to_bits()).hash(state);
    }
}

impl fmt::Debug for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorValue")
            .field("rgb", &self.rgb)
            .finish_non_exhaustive()
    }
}

/// Hex, with an alpha byte only when translucent.
impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_with(self.rgb.a < 1.0, false))
    }
}

impl From<Rgb> for ColorValue {
    fn from(rgb: Rgb) -> Self {
        Self::new(rgb)
    }
}

impl From<ColorValue> for String {
    fn from(value: ColorValue) -> Self {
        value.to_string()
    }
}

impl FromStr for ColorValue {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ColorValue {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for ColorValue {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}
