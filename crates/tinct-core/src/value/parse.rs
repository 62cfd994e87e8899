//! Input grammar for [`ColorValue`](super::ColorValue).
//!
//! ```text
//! color    := hex | function | integer | name
//! hex      := '#' (3 | 6 | 8 hex digits)
//! function := ('rgb' | 'rgba') '(' num ',' num ',' num [',' alpha] ')'
//!           | ('hsl' | 'hsla') '(' hue ',' pct ',' pct [',' alpha] ')'
//! integer  := '0x' 1..=8 hex digits
//! name     := CSS Level 4 color name | 'transparent'
//! ```
//!
//! Matching ignores ASCII case and whitespace around tokens. Numeric
//! components outside their range are clamped (and logged) unless strict
//! mode is on, in which case they fail with `OutOfRange`.

use crate::convert::ColorSpace;
use crate::convert::rgb::hsl_to_unit;
use crate::convert::spaces::{Hsl, Rgb, clamp_alpha};
use crate::error::{ParseError, ParseErrorKind, RangeWarning};

use super::named;

/// Parse a textual color into canonical RGBA.
pub(crate) fn parse_str(input: &str, strict: bool) -> Result<Rgb, ParseError> {
    let text = input.trim().to_ascii_lowercase();
    parse_normalized(&text, strict).map_err(|kind| ParseError::new(kind, input))
}

/// Interpret an integer: values above `0xFFFFFF` are `0xRRGGBBAA`.
pub(crate) fn parse_integer(value: u64) -> Result<Rgb, ParseError> {
    match u32::try_from(value) {
        Ok(v) if v > 0x00FF_FFFF => Ok(rgba32(v)),
        Ok(v) => Ok(rgb24(v)),
        Err(_) => Err(ParseError::new(
            ParseErrorKind::IntegerOutOfRange(value),
            format!("{value:#x}"),
        )),
    }
}

pub(crate) fn rgb24(value: u32) -> Rgb {
    let [_, r, g, b] = value.to_be_bytes();
    Rgb::new(r, g, b)
}

pub(crate) fn rgba32(value: u32) -> Rgb {
    let [r, g, b, a] = value.to_be_bytes();
    Rgb::with_alpha(r, g, b, f64::from(a) / 255.0)
}

fn parse_normalized(text: &str, strict: bool) -> Result<Rgb, ParseErrorKind> {
    if text.is_empty() {
        return Err(ParseErrorKind::Empty);
    }
    if let Some(digits) = text.strip_prefix('#') {
        return parse_hex(digits.trim());
    }
    if let Some(digits) = text.strip_prefix("0x") {
        return parse_hex_literal(digits);
    }
    if let Some(open) = text.find('(') {
        return parse_function(&text[..open], &text[open + 1..], strict);
    }
    if text == "transparent" {
        return Ok(Rgb::with_alpha(0, 0, 0, 0.0));
    }
    named::lookup(text)
        .map(|[r, g, b]| Rgb::new(r, g, b))
        .ok_or_else(|| ParseErrorKind::UnknownName(text.to_string()))
}

fn parse_hex(digits: &str) -> Result<Rgb, ParseErrorKind> {
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseErrorKind::InvalidHexDigit);
    }
    let nibble = |i: usize| -> u8 {
        // Validated above; every byte is a hex digit.
        (digits.as_bytes()[i] as char).to_digit(16).unwrap_or(0) as u8
    };
    let byte = |i: usize| nibble(i) << 4 | nibble(i + 1);
    match digits.len() {
        3 => Ok(Rgb::new(nibble(0) * 17, nibble(1) * 17, nibble(2) * 17)),
        6 => Ok(Rgb::new(byte(0), byte(2), byte(4))),
        8 => Ok(Rgb::with_alpha(
            byte(0),
            byte(2),
            byte(4),
            f64::from(byte(6)) / 255.0,
        )),
        len => Err(ParseErrorKind::InvalidHexLength(len)),
    }
}

fn parse_hex_literal(digits: &str) -> Result<Rgb, ParseErrorKind> {
    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseErrorKind::InvalidNumber(format!("0x{digits}")));
    }
    let value = u64::from_str_radix(digits, 16)
        .map_err(|_| ParseErrorKind::InvalidNumber(format!("0x{digits}")))?;
    match (digits.len(), u32::try_from(value)) {
        (0..=6, Ok(v)) => Ok(rgb24(v)),
        (_, Ok(v)) => Ok(rgba32(v)),
        (_, Err(_)) => Err(ParseErrorKind::IntegerOutOfRange(value)),
    }
}

fn parse_function(name: &str, rest: &str, strict: bool) -> Result<Rgb, ParseErrorKind> {
    let function: &'static str = match name.trim() {
        "rgb" => "rgb",
        "rgba" => "rgba",
        "hsl" => "hsl",
        "hsla" => "hsla",
        other => return Err(ParseErrorKind::UnknownFunction(other.to_string())),
    };
    let body = rest
        .trim_end()
        .strip_suffix(')')
        .ok_or(ParseErrorKind::MalformedFunction)?;
    if body.contains(['(', ')']) {
        return Err(ParseErrorKind::MalformedFunction);
    }

    let args: Vec<&str> = body.split(',').map(str::trim).collect();
    if !matches!(args.len(), 3 | 4) {
        return Err(ParseErrorKind::WrongArity {
            function,
            expected: if function.ends_with('a') { 4 } else { 3 },
            found: if body.trim().is_empty() { 0 } else { args.len() },
        });
    }
    if args.iter().any(|a| a.is_empty()) {
        return Err(ParseErrorKind::MalformedFunction);
    }

    let alpha = match args.get(3) {
        Some(token) => parse_alpha(token, strict)?,
        None => 1.0,
    };

    if function.starts_with("rgb") {
        let r = parse_rgb_channel(args[0], "r", strict)?;
        let g = parse_rgb_channel(args[1], "g", strict)?;
        let b = parse_rgb_channel(args[2], "b", strict)?;
        Ok(Rgb::with_alpha(r, g, b, alpha))
    } else {
        let h = parse_number(args[0].strip_suffix("deg").unwrap_or(args[0]).trim_end())?;
        let s = parse_percent(args[1], "saturation")?;
        let l = parse_percent(args[2], "lightness")?;
        let hsl = Hsl::new(h, s, l);
        if strict {
            hsl.check()?;
        } else if hsl.check().is_err() {
            tracing::debug!(h, s, l, "normalized out-of-range hsl() components");
        }
        Ok(Rgb::from_unit(hsl_to_unit(hsl), alpha))
    }
}

fn parse_number(token: &str) -> Result<f64, ParseErrorKind> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseErrorKind::InvalidNumber(token.to_string()))
}

fn parse_percent(token: &str, channel: &'static str) -> Result<f64, ParseErrorKind> {
    let number = token
        .strip_suffix('%')
        .ok_or(ParseErrorKind::MissingPercent(channel))?;
    parse_number(number.trim_end())
}

/// Clamp `value` into `[min, max]`, or reject it in strict mode.
fn bound(
    value: f64,
    channel: &'static str,
    space: ColorSpace,
    min: f64,
    max: f64,
    strict: bool,
) -> Result<f64, ParseErrorKind> {
    match RangeWarning::check(space, channel, value, min, max) {
        Ok(()) => Ok(value),
        Err(warning) if strict => Err(warning.into()),
        Err(_) => {
            let clamped = value.clamp(min, max);
            tracing::debug!(channel, value, clamped, "clamped out-of-range color component");
            Ok(clamped)
        }
    }
}

fn parse_rgb_channel(token: &str, channel: &'static str, strict: bool) -> Result<u8, ParseErrorKind> {
    let value = match token.strip_suffix('%') {
        Some(pct) => parse_number(pct.trim_end())? * 2.55,
        None => parse_number(token)?,
    };
    let value = bound(value, channel, ColorSpace::Rgb, 0.0, 255.0, strict)?;
    Ok(value.round() as u8)
}

fn parse_alpha(token: &str, strict: bool) -> Result<f64, ParseErrorKind> {
    let value = match token.strip_suffix('%') {
        Some(pct) => parse_number(pct.trim_end())? / 100.0,
        None => parse_number(token)?,
    };
    bound(value, "a", ColorSpace::Rgb, 0.0, 1.0, strict).map(clamp_alpha)
}
