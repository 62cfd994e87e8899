//! 3x3 matrices for the linear steps of the conversion pipeline.
//!
//! Forward matrices are transcribed from their published sources; every
//! inverse is derived once with [`glam::DMat3::inverse`] so that the forward
//! and inverse transforms agree to machine precision.

use std::sync::LazyLock;

use glam::{DMat3, DVec3};

/// A 3x3 color matrix for linear color space conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(DMat3);

impl ColorMatrix {
    /// Build from row-major coefficients, the layout papers print them in.
    pub const fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        // glam is column-major: column j collects element j of every row.
        Self(DMat3::from_cols(
            DVec3::new(rows[0][0], rows[1][0], rows[2][0]),
            DVec3::new(rows[0][1], rows[1][1], rows[2][1]),
            DVec3::new(rows[0][2], rows[1][2], rows[2][2]),
        ))
    }

    /// Apply this matrix to a triplet.
    #[inline]
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        (self.0 * DVec3::from_array(v)).to_array()
    }

    /// The exact inverse. All matrices used here are well-conditioned.
    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }
}

/// Linear sRGB → CIE XYZ (D65), IEC 61966-2-1 primaries, `Y` of white = 1.
pub const LINEAR_SRGB_TO_XYZ: ColorMatrix = ColorMatrix::from_rows([
    [0.412_456_4, 0.357_576_1, 0.180_437_5],
    [0.212_672_9, 0.715_152_2, 0.072_175_0],
    [0.019_333_9, 0.119_192_0, 0.950_304_1],
]);

/// CIE XYZ (D65) → linear sRGB.
pub static XYZ_TO_LINEAR_SRGB: LazyLock<ColorMatrix> =
    LazyLock::new(|| LINEAR_SRGB_TO_XYZ.inverse());

/// Linear sRGB → LMS cone response (Ottosson 2020, "M1" after folding in the
/// sRGB → XYZ step).
pub const LINEAR_SRGB_TO_LMS: ColorMatrix = ColorMatrix::from_rows([
    [0.412_221_470_8, 0.536_332_536_3, 0.051_445_992_9],
    [0.211_903_498_2, 0.680_699_545_1, 0.107_396_956_6],
    [0.088_302_461_9, 0.281_718_837_6, 0.629_978_700_5],
]);

/// LMS → linear sRGB.
pub static LMS_TO_LINEAR_SRGB: LazyLock<ColorMatrix> =
    LazyLock::new(|| LINEAR_SRGB_TO_LMS.inverse());

/// Non-linear LMS′ → OKLab (Ottosson 2020, "M2").
pub const LMS_PRIME_TO_OKLAB: ColorMatrix = ColorMatrix::from_rows([
    [0.210_454_255_3, 0.793_617_785_0, -0.004_072_046_8],
    [1.977_998_495_1, -2.428_592_205_0, 0.450_593_709_9],
    [0.025_904_037_1, 0.782_771_766_2, -0.808_675_766_0],
]);

/// OKLab → non-linear LMS′.
pub static OKLAB_TO_LMS_PRIME: LazyLock<ColorMatrix> =
    LazyLock::new(|| LMS_PRIME_TO_OKLAB.inverse());

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_from_rows_is_row_major() {
        let m = ColorMatrix::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(m.apply([1.0, 0.0, 0.0]), [1.0, 4.0, 7.0]);
        assert_eq!(m.apply([0.0, 0.0, 1.0]), [3.0, 6.0, 9.0]);
        assert_eq!(m.apply([1.0, 1.0, 1.0]), [6.0, 15.0, 24.0]);
    }

    #[test]
    fn test_inverse_roundtrips() {
        let v = [0.2, 0.6, 0.9];
        for (fwd, inv) in [
            (LINEAR_SRGB_TO_XYZ, *XYZ_TO_LINEAR_SRGB),
            (LINEAR_SRGB_TO_LMS, *LMS_TO_LINEAR_SRGB),
            (LMS_PRIME_TO_OKLAB, *OKLAB_TO_LMS_PRIME),
        ] {
            let back = inv.apply(fwd.apply(v));
            for i in 0..3 {
                assert!((back[i] - v[i]).abs() < EPSILON, "channel {i}: {back:?}");
            }
        }
    }

    #[test]
    fn test_srgb_white_maps_to_d65() {
        let xyz = LINEAR_SRGB_TO_XYZ.apply([1.0, 1.0, 1.0]);
        assert!((xyz[0] - 0.950_47).abs() < 1e-4);
        assert!((xyz[1] - 1.0).abs() < 1e-4);
        assert!((xyz[2] - 1.088_83).abs() < 1e-4);
    }

    #[test]
    fn test_lms_rows_preserve_neutral_axis() {
        let lms = LINEAR_SRGB_TO_LMS.apply([1.0, 1.0, 1.0]);
        for c in lms {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }
}
