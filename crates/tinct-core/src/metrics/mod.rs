//! Perceptual metrics built on the conversion engine.
//!
//! All functions are pure and take colors by reference; they can be called
//! from any number of threads without coordination.

pub mod delta_e;
pub mod wcag;

pub use delta_e::{
    Ciede2000Weights, delta_e_2000, delta_e_2000_lab, delta_e_2000_weighted, delta_e_oklab,
    delta_e_oklab_lab, delta_e76, delta_e76_lab,
};
pub use wcag::{
    TextSize, WcagLevel, best_contrast, contrast_ratio, is_light, is_wcag_compliant,
    readable_text_color, relative_luminance, rgb_luminance, wcag_level,
};
