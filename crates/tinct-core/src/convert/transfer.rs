//! sRGB companding (IEC 61966-2-1).
//!
//! Transfer functions convert between gamma-encoded channel values and
//! linear light. All inputs are unit-range floats.

/// A transfer function that converts between linear and non-linear encodings.
pub trait TransferFunction: Send + Sync {
    /// Convert from non-linear (encoded) to linear light.
    fn to_linear(&self, encoded: f64) -> f64;

    /// Convert from linear light to non-linear (encoded).
    fn to_encoded(&self, linear: f64) -> f64;
}

/// sRGB transfer function per IEC 61966-2-1.
///
/// ```text
/// to_linear:   V <= 0.04045 → V / 12.92
///              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
///
/// to_encoded:  L <= 0.0031308 → L × 12.92
///              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
/// ```
///
/// Negative inputs are mirrored so out-of-gamut intermediates from the
/// OKLab and LAB inverses survive the round trip before clamping.
#[derive(Debug, Clone, Copy)]
pub struct SrgbTransfer;

impl SrgbTransfer {
    const ENCODED_CUT: f64 = 0.04045;
    const LINEAR_CUT: f64 = 0.0031308;
    const SLOPE: f64 = 12.92;
    const GAMMA: f64 = 2.4;
    const OFFSET: f64 = 0.055;
}

impl TransferFunction for SrgbTransfer {
    fn to_linear(&self, encoded: f64) -> f64 {
        let magnitude = encoded.abs();
        let linear = if magnitude <= Self::ENCODED_CUT {
            magnitude / Self::SLOPE
        } else {
            ((magnitude + Self::OFFSET) / (1.0 + Self::OFFSET)).powf(Self::GAMMA)
        };
        linear.copysign(encoded)
    }

    fn to_encoded(&self, linear: f64) -> f64 {
        let magnitude = linear.abs();
        let encoded = if magnitude <= Self::LINEAR_CUT {
            magnitude * Self::SLOPE
        } else {
            (1.0 + Self::OFFSET) * magnitude.powf(1.0 / Self::GAMMA) - Self::OFFSET
        };
        encoded.copysign(linear)
    }
}

/// Linearize one sRGB-encoded channel.
#[inline]
pub fn linearize(encoded: f64) -> f64 {
    SrgbTransfer.to_linear(encoded)
}

/// Re-encode one linear channel with the sRGB curve.
#[inline]
pub fn delinearize(linear: f64) -> f64 {
    SrgbTransfer.to_encoded(linear)
}

/// Linearize an `[r, g, b]` triple.
pub fn linearize_rgb(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(linearize)
}

/// Encode an `[r, g, b]` triple of linear light.
pub fn delinearize_rgb(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(delinearize)
}
