//! Numeric helpers shared by every stage of the engine.
//!
//! Rounding is always half-away-from-zero (`f64::round`) so that repeated runs
//! over the same snapshot produce bit-identical output.

use serde_json::Value;

/// Round to `decimals` places for display.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round to two decimal places, the precision used for every displayed number.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Replace NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Coerce a loosely-typed JSON value into a finite number.
///
/// Numbers pass through, numeric strings are parsed, everything else
/// (null, missing, booleans, objects, unparseable text) becomes 0.
pub fn coerce_number(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    finite_or_zero(raw)
}

/// Like [`coerce_number`] but keeps "absent" distinguishable from zero.
pub fn coerce_optional_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Check that a caller-supplied quantity is finite and not negative.
pub fn ensure_non_negative(name: &str, value: f64) -> crate::DemandResult<f64> {
    if !value.is_finite() {
        return Err(crate::DemandError::invalid(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(crate::DemandError::invalid(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round2() {
        assert_eq!(round2(6.666_666), 6.67);
        assert_eq!(round2(2.1666), 2.17);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), 12.5);
        assert_eq!(coerce_number(&json!("7.25")), 7.25);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
        assert_eq!(coerce_number(&json!({ "x": 1 })), 0.0);
    }

    #[test]
    fn test_coerce_optional_number() {
        assert_eq!(coerce_optional_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_optional_number(&json!(null)), None);
        assert_eq!(coerce_optional_number(&json!("NaN")), None);
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("stock", 0.0).is_ok());
        assert!(ensure_non_negative("stock", -1.0).is_err());
        assert!(ensure_non_negative("stock", f64::NAN).is_err());
        assert!(ensure_non_negative("stock", f64::INFINITY).is_err());
    }
}
