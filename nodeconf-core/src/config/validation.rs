use std::time::Duration;

use crate::error::{Error, Result};
use crate::options::{OptionKind, OptionValue};
use crate::sources::RawValue;

pub const DEFAULT_LIST_DELIMITER: char = ',';

pub fn coerce(name: &str, raw: &RawValue, kind: OptionKind) -> Result<OptionValue> {
    coerce_with_delimiter(name, raw, kind, DEFAULT_LIST_DELIMITER)
}

pub fn coerce_with_delimiter(
    name: &str,
    raw: &RawValue,
    kind: OptionKind,
    list_delimiter: char,
) -> Result<OptionValue> {
    let mismatch = || Error::TypeMismatch {
        name: name.to_owned(),
        expected: kind,
        got: raw.repr(),
        origin: None,
    };

    match raw {
        RawValue::Typed(value) if value.kind() == kind => Ok(value.clone()),
        RawValue::Typed(_) => Err(mismatch()),
        RawValue::Sequence(items) if kind == OptionKind::StringList => {
            Ok(OptionValue::StringList(items.clone()))
        }
        RawValue::Sequence(_) => Err(mismatch()),
        RawValue::Scalar(text) => {
            let value = match kind {
                OptionKind::Bool => parse_bool(text).map(OptionValue::Bool),
                OptionKind::Integer => parse_integer(text).map(OptionValue::Integer),
                OptionKind::Float => parse_float(text).map(OptionValue::Float),
                OptionKind::Duration => parse_duration(text).map(OptionValue::Duration),
                OptionKind::String => Some(OptionValue::String(text.clone())),
                OptionKind::StringList => {
                    Some(OptionValue::StringList(split_list(text, list_delimiter)))
                }
            };
            value.ok_or_else(mismatch)
        }
    }
}

pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Signed 64-bit integer: decimal or `0x` hex, `_` allowed between digits.
pub fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, body) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    let digits: String = body.chars().filter(|c| *c != '_').collect();
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::try_from(u128::from_str_radix(&digits, radix).ok()?).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

pub fn parse_float(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// One or more `<number><unit>` groups (`1h30m`, `1.5s`, `250ms`); a bare
/// `0` is zero. Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text == "0" {
        return Some(Duration::ZERO);
    }
    if text.is_empty() {
        return None;
    }

    let mut rest = text;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let whole_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let whole = &rest[..whole_len];
        rest = &rest[whole_len..];

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let fraction_len = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            fraction = &after_dot[..fraction_len];
            rest = &after_dot[fraction_len..];
        }
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_len = rest
            .find(|c: char| !c.is_alphabetic())
            .unwrap_or(rest.len());
        let unit = unit_nanos(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        total = total.checked_add(group_nanos(whole, fraction, unit)?)?;
    }

    u64::try_from(total).ok().map(Duration::from_nanos)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

fn group_nanos(whole: &str, fraction: &str, unit: u128) -> Option<u128> {
    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().ok()?
    };
    let mut nanos = whole.checked_mul(unit)?;

    // Digits past the 18th cannot change the result by a whole nanosecond.
    let fraction = &fraction[..fraction.len().min(18)];
    if !fraction.is_empty() {
        let scale = 10u128.pow(fraction.len() as u32);
        let numerator = fraction.parse::<u128>().ok()?;
        nanos = nanos.checked_add(numerator * unit / scale)?;
    }
    Some(nanos)
}

pub fn split_list(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
