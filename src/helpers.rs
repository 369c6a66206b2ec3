//! Shared helpers for turning provider floats into display integers.
//!
//! Temperatures, wind speed and humidity are shown as whole numbers. Rounding
//! is `f64::round`, i.e. half away from zero (12.5 → 13, -12.5 → -13).
//!
//! Non-finite inputs cannot come out of a JSON document, but the helpers still
//! guard against them so a bad value never turns into a bogus reading.

/// Round an f64 to the nearest integer, half away from zero.
///
/// Returns `None` for NaN/±Inf. Values beyond the `i32` range saturate.
pub(crate) fn round_to_i32(v: f64) -> Option<i32> {
    if !v.is_finite() {
        tracing::warn!("round_to_i32 received non-finite value {}", v);
        return None;
    }
    Some(v.round() as i32)
}

/// Round an optional f64, keeping absence as absence (never defaulting to 0).
pub(crate) fn opt_round_to_i32(v: Option<f64>) -> Option<i32> {
    v.and_then(round_to_i32)
}

/// Interpret a JSON number as an integral weather code.
///
/// Accepts `3` and `3.0`; rejects `3.5`, strings, and everything else.
/// Integers outside the `i64` range saturate to `i64::MIN`/`i64::MAX`, which
/// no table code uses, so they classify as unknown.
pub(crate) fn json_to_code(v: &serde_json::Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }
    if v.is_u64() {
        return Some(i64::MAX);
    }
    let f = v.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 {
        // `as` saturates at the i64 bounds
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_i32_normal() {
        assert_eq!(round_to_i32(12.6), Some(13));
        assert_eq!(round_to_i32(12.4), Some(12));
        assert_eq!(round_to_i32(9.4), Some(9));
    }

    #[test]
    fn test_round_to_i32_half_away_from_zero() {
        assert_eq!(round_to_i32(0.5), Some(1));
        assert_eq!(round_to_i32(-0.5), Some(-1));
        assert_eq!(round_to_i32(-4.5), Some(-5));
    }

    #[test]
    fn test_round_to_i32_negative() {
        assert_eq!(round_to_i32(-3.7), Some(-4));
        assert_eq!(round_to_i32(-0.2), Some(0));
    }

    #[test]
    fn test_round_to_i32_nan() {
        assert_eq!(round_to_i32(f64::NAN), None);
    }

    #[test]
    fn test_round_to_i32_infinity() {
        assert_eq!(round_to_i32(f64::INFINITY), None);
        assert_eq!(round_to_i32(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_round_to_i32_saturates() {
        assert_eq!(round_to_i32(1e12), Some(i32::MAX));
    }

    #[test]
    fn test_opt_round_to_i32() {
        assert_eq!(opt_round_to_i32(None), None);
        assert_eq!(opt_round_to_i32(Some(0.0)), Some(0));
        assert_eq!(opt_round_to_i32(Some(81.6)), Some(82));
    }

    #[test]
    fn test_json_to_code() {
        assert_eq!(json_to_code(&serde_json::json!(3)), Some(3));
        assert_eq!(json_to_code(&serde_json::json!(3.0)), Some(3));
        assert_eq!(json_to_code(&serde_json::json!(-1)), Some(-1));
        assert_eq!(json_to_code(&serde_json::json!(3.5)), None);
        assert_eq!(json_to_code(&serde_json::json!("3")), None);
        assert_eq!(json_to_code(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_json_to_code_out_of_i64_range_saturates() {
        assert_eq!(json_to_code(&serde_json::json!(u64::MAX)), Some(i64::MAX));
        assert_eq!(json_to_code(&serde_json::json!(1e20)), Some(i64::MAX));
        assert_eq!(json_to_code(&serde_json::json!(-1e20)), Some(i64::MIN));
    }
}
