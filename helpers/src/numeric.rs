//! Numeric interpretation of JSON values.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A number pulled out of a JSON value.
///
/// Integers stay exact as long as they fit in an `i64`; everything else is
/// carried as a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    /// Read a number from a JSON number or a numeric string.
    ///
    /// Booleans, nulls and containers are not numeric.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self::from_number(number)),
            Value::String(raw) => Self::parse(raw),
            _ => None,
        }
    }

    fn from_number(number: &Number) -> Self {
        match number.as_i64() {
            Some(int) => Numeric::Int(int),
            None => Numeric::Float(number.as_f64().unwrap_or(f64::NAN)),
        }
    }

    /// Parse a numeric string such as `"42"`, `" -3 "` or `"1.5e3"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Some(Numeric::Int(int));
        }
        // Rust accepts "inf" and "NaN"; numeric strings never mean those.
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|float| float.is_finite())
            .map(Numeric::Float)
    }

    /// Value as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(int) => int as f64,
            Numeric::Float(float) => float,
        }
    }

    /// Total ordering by numeric value.
    ///
    /// Integers and floats compare exactly, without rounding the integer to a
    /// float. `0.0` and `-0.0` are equal; NaN sorts above every number.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (*self, *other) {
            (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
            (Numeric::Int(a), Numeric::Float(b)) => int_float_cmp(a, b),
            (Numeric::Float(a), Numeric::Int(b)) => int_float_cmp(b, a).reverse(),
            (Numeric::Float(a), Numeric::Float(b)) => a
                .partial_cmp(&b)
                .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan())),
        }
    }

    /// Convert back to a JSON value.
    pub fn to_value(self) -> Value {
        match self {
            Numeric::Int(int) => Value::from(int),
            Numeric::Float(float) => Number::from_f64(float)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

/// 2^63 as a float: the first value above `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn int_float_cmp(int: i64, float: f64) -> Ordering {
    if float.is_nan() || float >= I64_BOUND {
        return Ordering::Less;
    }
    if float < -I64_BOUND {
        return Ordering::Greater;
    }

    // In range, so the truncated float converts to i64 exactly.
    let whole = float.trunc();
    int.cmp(&(whole as i64)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Int(0)
    }
}

impl Add for Numeric {
    type Output = Numeric;

    /// Integer addition, promoted to float on overflow or mixed operands.
    fn add(self, other: Numeric) -> Numeric {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => match a.checked_add(b) {
                Some(sum) => Numeric::Int(sum),
                None => Numeric::Float(a as f64 + b as f64),
            },
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sum for Numeric {
    fn sum<I: Iterator<Item = Numeric>>(iter: I) -> Numeric {
        iter.fold(Numeric::default(), Add::add)
    }
}

impl From<i64> for Numeric {
    fn from(int: i64) -> Self {
        Numeric::Int(int)
    }
}

impl From<f64> for Numeric {
    fn from(float: f64) -> Self {
        Numeric::Float(float)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(int) => write!(f, "{}", int),
            Numeric::Float(float) => write!(f, "{}", float),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_numbers() {
        assert_eq!(Numeric::from_value(&json!(3)), Some(Numeric::Int(3)));
        assert_eq!(Numeric::from_value(&json!(-2.5)), Some(Numeric::Float(-2.5)));
        assert_eq!(
            Numeric::from_value(&json!(u64::MAX)),
            Some(Numeric::Float(u64::MAX as f64))
        );
    }

    #[test]
    fn from_numeric_strings() {
        assert_eq!(Numeric::from_value(&json!("12")), Some(Numeric::Int(12)));
        assert_eq!(Numeric::from_value(&json!(" 7 ")), Some(Numeric::Int(7)));
        assert_eq!(Numeric::from_value(&json!("1.5e2")), Some(Numeric::Float(150.0)));
        assert_eq!(Numeric::from_value(&json!("abc")), None);
        assert_eq!(Numeric::from_value(&json!("NaN")), None);
        assert_eq!(Numeric::from_value(&json!("")), None);
    }

    #[test]
    fn non_numeric_values() {
        assert_eq!(Numeric::from_value(&json!(true)), None);
        assert_eq!(Numeric::from_value(&Value::Null), None);
        assert_eq!(Numeric::from_value(&json!([1])), None);
    }

    #[test]
    fn addition_promotes() {
        assert_eq!(Numeric::Int(2) + Numeric::Int(3), Numeric::Int(5));
        assert_eq!(Numeric::Int(2) + Numeric::Float(0.5), Numeric::Float(2.5));
        assert!(matches!(
            Numeric::Int(i64::MAX) + Numeric::Int(1),
            Numeric::Float(_)
        ));
    }

    #[test]
    fn ordering_mixed() {
        assert_eq!(Numeric::Int(2).total_cmp(&Numeric::Float(2.5)), Ordering::Less);
        assert_eq!(Numeric::Int(3).total_cmp(&Numeric::Int(3)), Ordering::Equal);
        assert_eq!(Numeric::Float(1.0).total_cmp(&Numeric::Int(0)), Ordering::Greater);
        assert_eq!(Numeric::Int(-3).total_cmp(&Numeric::Float(-3.5)), Ordering::Greater);
        assert_eq!(Numeric::Int(0).total_cmp(&Numeric::Float(-0.0)), Ordering::Equal);
        assert_eq!(Numeric::Float(0.0).total_cmp(&Numeric::Float(-0.0)), Ordering::Equal);
    }

    #[test]
    fn ordering_exact_near_i64_limits() {
        let bound = Numeric::Float(9_223_372_036_854_775_808.0);
        assert_eq!(Numeric::Int(i64::MAX).total_cmp(&bound), Ordering::Less);
        assert_eq!(Numeric::Int(i64::MAX - 1).total_cmp(&bound), Ordering::Less);
        assert_eq!(
            Numeric::Int(i64::MAX).total_cmp(&Numeric::Int(i64::MAX - 1)),
            Ordering::Greater
        );

        let low = Numeric::Float(-9_223_372_036_854_775_808.0);
        assert_eq!(Numeric::Int(i64::MIN).total_cmp(&low), Ordering::Equal);
        assert_eq!(Numeric::Int(i64::MIN + 1).total_cmp(&low), Ordering::Greater);
        assert_eq!(low.total_cmp(&Numeric::Float(-1e19)), Ordering::Greater);
    }

    #[test]
    fn ordering_nan_is_greatest() {
        let nan = Numeric::Float(f64::NAN);
        assert_eq!(Numeric::Int(i64::MAX).total_cmp(&nan), Ordering::Less);
        assert_eq!(nan.total_cmp(&Numeric::Float(f64::MAX)), Ordering::Greater);
        assert_eq!(nan.total_cmp(&nan), Ordering::Equal);
    }

    #[test]
    fn to_value() {
        assert_eq!(Numeric::Int(6).to_value(), json!(6));
        assert_eq!(Numeric::Float(1.5).to_value(), json!(1.5));
    }
}
