//! Error types for the input boundary and the persistence/config edges.
//!
//! Everything past parsing is total arithmetic, so the only fallible
//! surfaces are color parsing, strict range checks, JSON snapshots, and
//! config loading.

use std::fmt;

use crate::convert::ColorSpace;

/// A numeric channel outside its nominal range.
///
/// Lenient callers never see this: the engine normalizes hue and clamps
/// everything else. Strict parsing and [`check`](crate::convert::spaces::Hsl::check)
/// surface it instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{space} channel `{channel}` = {value} is outside [{min}, {max}]")]
pub struct RangeWarning {
    pub space: ColorSpace,
    pub channel: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl RangeWarning {
    /// Returns `Err` when `value` falls outside `[min, max]` (NaN included).
    pub(crate) fn check(
        space: ColorSpace,
        channel: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), Self> {
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(Self {
                space,
                channel,
                value,
                min,
                max,
            })
        }
    }
}

/// Why an input failed to match the color grammar.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("input is empty")]
    Empty,

    #[error("hex color must have 3, 6, or 8 digits, found {0}")]
    InvalidHexLength(usize),

    #[error("hex color contains a non-hex digit")]
    InvalidHexDigit,

    #[error("unknown color function `{0}`")]
    UnknownFunction(String),

    #[error("malformed color function syntax")]
    MalformedFunction,

    #[error("`{function}()` takes {expected} components, found {found}")]
    WrongArity {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{0}` is not a number")]
    InvalidNumber(String),

    #[error("{0} must carry a `%` suffix")]
    MissingPercent(&'static str),

    #[error("`{0}` is not a named color")]
    UnknownName(String),

    #[error("integer {0:#x} does not fit in 32 bits")]
    IntegerOutOfRange(u64),

    #[error(transparent)]
    OutOfRange(#[from] RangeWarning),
}

/// A color input that matched no grammar rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The raw input, exactly as the caller supplied it.
    pub input: String,
    /// A valid format close to what the caller attempted, if one is obvious.
    pub suggestion: Option<&'static str>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, input: impl Into<String>) -> Self {
        let suggestion = suggest(&kind);
        Self {
            kind,
            input: input.into(),
            suggestion,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color {:?}: {}", self.input, self.kind)?;
        if let Some(hint) = self.suggestion {
            write!(f, " (expected {hint})")?;
        }
        Ok(())
    }
}

fn suggest(kind: &ParseErrorKind) -> Option<&'static str> {
    match kind {
        ParseErrorKind::InvalidHexLength(_) | ParseErrorKind::InvalidHexDigit => {
            Some("#RGB, #RRGGBB, or #RRGGBBAA")
        }
        ParseErrorKind::WrongArity { function, .. } => match *function {
            "rgb" => Some("rgb(r, g, b)"),
            "rgba" => Some("rgba(r, g, b, a)"),
            "hsl" => Some("hsl(h, s%, l%)"),
            "hsla" => Some("hsla(h, s%, l%, a)"),
            _ => None,
        },
        ParseErrorKind::MissingPercent(_) => Some("hsl(h, s%, l%)"),
        ParseErrorKind::UnknownFunction(_) | ParseErrorKind::MalformedFunction => {
            Some("rgb(), rgba(), hsl(), or hsla()")
        }
        ParseErrorKind::UnknownName(_) | ParseErrorKind::Empty => {
            Some("a hex code, rgb()/hsl() function, CSS color name, or 0xRRGGBB")
        }
        ParseErrorKind::IntegerOutOfRange(_) => Some("0xRRGGBB or 0xRRGGBBAA"),
        ParseErrorKind::InvalidNumber(_) | ParseErrorKind::OutOfRange(_) => None,
    }
}

/// Failure to encode or decode a cache snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to load an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returned by [`Cache::set_strategy`](crate::cache::Cache::set_strategy)
/// when the cache already holds entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("eviction strategy can only change on an empty cache ({len} entries present)")]
pub struct StrategyLocked {
    pub len: usize,
}
