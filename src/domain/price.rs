//! Prices are held as integer minor units (1/100 of the currency unit).
//!
//! The catalog sends prices in major units, as JSON integers, decimals or
//! decimal strings. Integers and strings convert exactly; decimals are
//! rounded to the nearest minor unit.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub const MINOR_PER_MAJOR: u64 = 100;

/// `1497` -> `"14.97"`.
pub fn format_minor_units(amount: u64) -> String {
    format!("{}.{:02}", amount / MINOR_PER_MAJOR, amount % MINOR_PER_MAJOR)
}

/// Parse `"199"`, `"199.5"` or `"199.50"` exactly. More than two fractional
/// digits, signs and exponents are rejected.
pub fn parse_major_units(value: &str) -> Option<u64> {
    let value = value.trim();
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };
    if whole.is_empty() || fraction.len() > 2 {
        return None;
    }
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !digits(fraction) {
        return None;
    }

    let whole: u64 = whole.parse().ok()?;
    let fraction: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(MINOR_PER_MAJOR)?.checked_add(fraction)
}

pub fn serialize<S: Serializer>(amount: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_minor_units(*amount))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    deserializer.deserialize_any(MajorUnitsVisitor)
}

struct MajorUnitsVisitor;

impl<'de> Visitor<'de> for MajorUnitsVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative price")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        v.checked_mul(MINOR_PER_MAJOR)
            .ok_or_else(|| E::custom(format!("price {} is too large", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!("price {} is negative", v))),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        if !v.is_finite() || v < 0.0 {
            return Err(E::custom(format!("price {} is not a non-negative number", v)));
        }
        let minor = (v * MINOR_PER_MAJOR as f64).round();
        if minor >= u64::MAX as f64 {
            return Err(E::custom(format!("price {} is too large", v)));
        }
        Ok(minor as u64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        parse_major_units(v).ok_or_else(|| E::custom(format!("invalid price '{}'", v)))
    }
}
