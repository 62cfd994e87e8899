//! Conversion engine: exact, stateless transforms between RGB and nine
//! other color spaces.
//!
//! Every function here is pure and total over its documented input range:
//! out-of-range values are normalized or clamped, never rejected. LAB and
//! OKLab route through linear sRGB (and XYZ for LAB); the cylindrical
//! models are polar views of their Cartesian parents.

pub mod cie;
pub mod matrix;
pub mod oklab;
pub mod rgb;
pub mod spaces;
pub mod transfer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use cie::{
    lab_to_lch, lab_to_rgb, lab_to_xyz, lch_to_lab, lch_to_rgb, rgb_to_lab, rgb_to_lch,
    rgb_to_xyz, xyz_to_lab, xyz_to_rgb,
};
pub use oklab::{
    oklab_to_oklch, oklab_to_rgb, oklch_to_oklab, oklch_to_rgb, rgb_to_oklab, rgb_to_oklch,
};
pub use rgb::{
    cmyk_to_rgb, hsl_to_rgb, hsv_to_rgb, hwb_to_rgb, rgb_to_cmyk, rgb_to_hsl, rgb_to_hsv,
    rgb_to_hwb,
};
use spaces::{Cmyk, Hsl, Hsv, Hwb, Lab, Lch, Oklab, Oklch, Rgb, Xyz};

use crate::error::RangeWarning;

/// Identifies one of the ten supported color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    Hsl,
    Hsv,
    Hwb,
    Xyz,
    Lab,
    Lch,
    Oklab,
    Oklch,
    Cmyk,
}

impl ColorSpace {
    /// Short lowercase identifier, also the serialized form.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Hsl => "hsl",
            Self::Hsv => "hsv",
            Self::Hwb => "hwb",
            Self::Xyz => "xyz",
            Self::Lab => "lab",
            Self::Lch => "lch",
            Self::Oklab => "oklab",
            Self::Oklch => "oklch",
            Self::Cmyk => "cmyk",
        }
    }

    /// All supported spaces.
    pub fn all() -> &'static [Self] {
        const ALL: [ColorSpace; 10] = [
            ColorSpace::Rgb,
            ColorSpace::Hsl,
            ColorSpace::Hsv,
            ColorSpace::Hwb,
            ColorSpace::Xyz,
            ColorSpace::Lab,
            ColorSpace::Lch,
            ColorSpace::Oklab,
            ColorSpace::Oklch,
            ColorSpace::Cmyk,
        ];
        &ALL
    }

    /// Whether the space has a hue angle channel.
    pub const fn is_cylindrical(&self) -> bool {
        matches!(self, Self::Hsl | Self::Hsv | Self::Hwb | Self::Lch | Self::Oklch)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for [`ColorSpace::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color space `{0}`")]
pub struct UnknownColorSpace(pub String);

impl FromStr for ColorSpace {
    type Err = UnknownColorSpace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|space| space.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownColorSpace(s.to_string()))
    }
}

/// A color expressed in one specific space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", content = "value", rename_all = "lowercase")]
pub enum Projection {
    Rgb(Rgb),
    Hsl(Hsl),
    Hsv(Hsv),
    Hwb(Hwb),
    Xyz(Xyz),
    Lab(Lab),
    Lch(Lch),
    Oklab(Oklab),
    Oklch(Oklch),
    Cmyk(Cmyk),
}

impl Projection {
    pub const fn space(&self) -> ColorSpace {
        match self {
            Self::Rgb(_) => ColorSpace::Rgb,
            Self::Hsl(_) => ColorSpace::Hsl,
            Self::Hsv(_) => ColorSpace::Hsv,
            Self::Hwb(_) => ColorSpace::Hwb,
            Self::Xyz(_) => ColorSpace::Xyz,
            Self::Lab(_) => ColorSpace::Lab,
            Self::Lch(_) => ColorSpace::Lch,
            Self::Oklab(_) => ColorSpace::Oklab,
            Self::Oklch(_) => ColorSpace::Oklch,
            Self::Cmyk(_) => ColorSpace::Cmyk,
        }
    }

    /// Report the first channel outside its space's nominal range.
    pub fn check(&self) -> Result<(), RangeWarning> {
        match self {
            Self::Rgb(c) => RangeWarning::check(ColorSpace::Rgb, "a", c.a, 0.0, 1.0),
            Self::Hsl(c) => c.check(),
            Self::Hsv(c) => c.check(),
            Self::Hwb(c) => c.check(),
            Self::Xyz(c) => c.check(),
            Self::Lab(c) => c.check(),
            Self::Lch(c) => c.check(),
            Self::Oklab(c) => c.check(),
            Self::Oklch(c) => c.check(),
            Self::Cmyk(c) => c.check(),
        }
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Projection {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_record!(Rgb, Hsl, Hsv, Hwb, Xyz, Lab, Lch, Oklab, Oklch, Cmyk);

/// Project an RGB color into `space`.
pub fn project(rgb: Rgb, space: ColorSpace) -> Projection {
    match space {
        ColorSpace::Rgb => Projection::Rgb(rgb),
        ColorSpace::Hsl => Projection::Hsl(rgb_to_hsl(rgb)),
        ColorSpace::Hsv => Projection::Hsv(rgb_to_hsv(rgb)),
        ColorSpace::Hwb => Projection::Hwb(rgb_to_hwb(rgb)),
        ColorSpace::Xyz => Projection::Xyz(rgb_to_xyz(rgb)),
        ColorSpace::Lab => Projection::Lab(rgb_to_lab(rgb)),
        ColorSpace::Lch => Projection::Lch(rgb_to_lch(rgb)),
        ColorSpace::Oklab => Projection::Oklab(rgb_to_oklab(rgb)),
        ColorSpace::Oklch => Projection::Oklch(rgb_to_oklch(rgb)),
        ColorSpace::Cmyk => Projection::Cmyk(rgb_to_cmyk(rgb)),
    }
}

/// Map a projection back to opaque 8-bit RGB (RGB projections keep their alpha).
pub fn unproject(projection: &Projection) -> Rgb {
    match *projection {
        Projection::Rgb(c) => c,
        Projection::Hsl(c) => hsl_to_rgb(c),
        Projection::Hsv(c) => hsv_to_rgb(c),
        Projection::Hwb(c) => hwb_to_rgb(c),
        Projection::Xyz(c) => xyz_to_rgb(c),
        Projection::Lab(c) => lab_to_rgb(c),
        Projection::Lch(c) => lch_to_rgb(c),
        Projection::Oklab(c) => oklab_to_rgb(c),
        Projection::Oklch(c) => oklch_to_rgb(c),
        Projection::Cmyk(c) => cmyk_to_rgb(c),
    }
}
