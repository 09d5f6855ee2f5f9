//! Forgiving decoders for values the host stores.
//!
//! The property panel writes an untouched dropdown as `""` and a numeric
//! input as whatever number the browser produced, `62.5` included. Blank or
//! unreadable values fall back to the field's default instead of failing
//! the whole document.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

/// An enum variant, or the default for blanks and unknown names.
pub(super) fn variant<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(optional_variant(deserializer)?.unwrap_or_default())
}

/// An enum variant, or `None` for blanks and unknown names.
pub(super) fn optional_variant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => serde_json::from_value(other).ok(),
    })
}

/// A number in any JSON shape, or `None` when there is none.
///
/// Numeric strings count; non-finite values do not.
pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(n.filter(|n| n.is_finite()))
}

/// An optional whole number, rounded and clamped at zero.
pub(super) fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.map(|n| round_within(n, u32::MAX)))
}

/// Round to the nearest whole number in `0..=max`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn round_within(n: f64, max: u32) -> u32 {
    // Clamped into u32 range first, so the cast is exact.
    n.round().clamp(0.0, f64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_clamps() {
        assert_eq!(round_within(62.5, 100), 63);
        assert_eq!(round_within(-4.0, 100), 0);
        assert_eq!(round_within(250.0, 100), 100);
        assert_eq!(round_within(1e12, u32::MAX), u32::MAX);
    }

    #[test]
    fn numbers_from_any_shape() {
        let read = |v: Value| number(v).unwrap();
        assert_eq!(read(serde_json::json!(12)), Some(12.0));
        assert_eq!(read(serde_json::json!(" 7.5 ")), Some(7.5));
        assert_eq!(read(serde_json::json!("")), None);
        assert_eq!(read(serde_json::json!(null)), None);
        assert_eq!(read(serde_json::json!(true)), None);
    }
}
