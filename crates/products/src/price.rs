//! Price wire format.
//!
//! Prices are held as integer minor units (`1999`) and travel as decimal major
//! units (`19.99`). Use with `#[serde(with = "crate::price")]`.

use serde::{Deserialize, Deserializer, Serializer, de};

const MINOR_PER_MAJOR: u64 = 100;

pub fn serialize<S: Serializer>(minor: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(*minor as f64 / MINOR_PER_MAJOR as f64)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let major = f64::deserialize(deserializer)?;
    to_minor(major).map_err(de::Error::custom)
}

/// Exact conversion through the shortest decimal form of `major`.
fn to_minor(major: f64) -> Result<u64, String> {
    if !(major.is_finite() && major >= 0.0) {
        return Err(format!("price must be a non-negative number, got {major}"));
    }

    let text = major.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if fraction.len() > 2 {
        return Err(format!("price {text} has more than two decimal places"));
    }

    let too_large = || format!("price {text} is too large");
    let whole: u64 = whole.parse().map_err(|_| too_large())?;
    let fraction: u64 = format!("{fraction:0<2}").parse().map_err(|_| too_large())?;

    whole
        .checked_mul(MINOR_PER_MAJOR)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(too_large)
}
