//! WCAG 2.x relative luminance, contrast ratio, and compliance levels.
//!
//! ```text
//! L = 0.2126 × R_lin + 0.7152 × G_lin + 0.0722 × B_lin
//! contrast = (L_lighter + 0.05) / (L_darker + 0.05)      ∈ [1, 21]
//! ```
//!
//! Alpha is ignored: colors are compared as if composited onto themselves.

use serde::{Deserialize, Serialize};

use crate::convert::spaces::Rgb;
use crate::convert::transfer::linearize;
use crate::value::ColorValue;

/// Rec. 709 / sRGB luminance weights.
const LUMA_REC709: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Luminance at which black and white text have equal contrast:
/// `sqrt(1.05 × 0.05) − 0.05`.
const LIGHT_DARK_CROSSOVER: f64 = 0.179_128_784_747_792;

/// WCAG conformance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA")]
    Aaa,
}

/// Text size class. Large text is at least 18pt, or 14pt bold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    #[default]
    Normal,
    Large,
}

impl WcagLevel {
    /// Minimum contrast ratio for this level and text size.
    pub const fn min_ratio(self, size: TextSize) -> f64 {
        match (self, size) {
            (Self::Aa, TextSize::Normal) => 4.5,
            (Self::Aa, TextSize::Large) => 3.0,
            (Self::Aaa, TextSize::Normal) => 7.0,
            (Self::Aaa, TextSize::Large) => 4.5,
        }
    }
}

/// Relative luminance of 8-bit sRGB, in `[0, 1]`.
pub fn rgb_luminance(rgb: Rgb) -> f64 {
    let [r, g, b] = rgb.to_unit().map(linearize);
    LUMA_REC709[0] * r + LUMA_REC709[1] * g + LUMA_REC709[2] * b
}

/// Relative luminance in `[0, 1]`.
pub fn relative_luminance(color: &ColorValue) -> f64 {
    rgb_luminance(color.to_rgb())
}

fn ratio_of(la: f64, lb: f64) -> f64 {
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// WCAG contrast ratio in `[1, 21]`; symmetric in its arguments.
pub fn contrast_ratio(a: &ColorValue, b: &ColorValue) -> f64 {
    ratio_of(relative_luminance(a), relative_luminance(b))
}

/// Whether `fg` on `bg` meets `level` for text of `size`.
pub fn is_wcag_compliant(fg: &ColorValue, bg: &ColorValue, level: WcagLevel, size: TextSize) -> bool {
    contrast_ratio(fg, bg) >= level.min_ratio(size)
}

/// The highest level `fg` on `bg` satisfies, if any.
pub fn wcag_level(fg: &ColorValue, bg: &ColorValue, size: TextSize) -> Option<WcagLevel> {
    let ratio = contrast_ratio(fg, bg);
    [WcagLevel::Aaa, WcagLevel::Aa]
        .into_iter()
        .find(|level| ratio >= level.min_ratio(size))
}

/// The candidate with the highest contrast against `bg`. Earlier candidates
/// win ties.
pub fn best_contrast<'a>(bg: &ColorValue, candidates: &'a [ColorValue]) -> Option<&'a ColorValue> {
    let bg_luminance = relative_luminance(bg);
    let mut best: Option<(&ColorValue, f64)> = None;
    for candidate in candidates {
        let ratio = ratio_of(relative_luminance(candidate), bg_luminance);
        if best.is_none_or(|(_, r)| ratio > r) {
            best = Some((candidate, ratio));
        }
    }
    best.map(|(c, _)| c)
}

/// Whether black text reads better than white text on this color.
pub fn is_light(color: &ColorValue) -> bool {
    relative_luminance(color) > LIGHT_DARK_CROSSOVER
}

/// Black or white, whichever contrasts more with `bg`.
pub fn readable_text_color(bg: &ColorValue) -> ColorValue {
    if is_light(bg) {
        ColorValue::from_rgb(0, 0, 0)
    } else {
        ColorValue::from_rgb(255, 255, 255)
    }
}
