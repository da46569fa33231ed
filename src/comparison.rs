use crate::value::{coerce_number, Value};
use std::cmp::Ordering;

/// Compare two values and hand the ordering to `pred_on_ord`.
///
/// Numbers compare numerically, also against numeric strings. Values that
/// have no natural order fall back to comparing their rendered text.
pub fn cmp_values<F>(a: &Value, b: &Value, pred_on_ord: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => pred_on_ord(sa.cmp(sb)),
        (Value::Number(na), Value::Number(nb)) => cmp_f64(*na, *nb).map_or(false, pred_on_ord),
        (Value::Bool(ba), Value::Bool(bb)) => pred_on_ord(ba.cmp(bb)),
        (Value::Null, Value::Null) => pred_on_ord(Ordering::Equal),
        (Value::Number(na), Value::String(sb)) => {
            match cmp_f64(*na, coerce_number(sb)) {
                Some(ord) => pred_on_ord(ord),
                None => pred_on_ord(a.to_string().cmp(&b.to_string())),
            }
        }
        (Value::String(sa), Value::Number(nb)) => {
            match cmp_f64(coerce_number(sa), *nb) {
                Some(ord) => pred_on_ord(ord),
                None => pred_on_ord(a.to_string().cmp(&b.to_string())),
            }
        }
        (Value::Bool(_), Value::Number(_)) | (Value::Number(_), Value::Bool(_)) => {
            cmp_f64(a.coerce_f64(), b.coerce_f64()).map_or(false, pred_on_ord)
        }
        _ => pred_on_ord(a.to_string().cmp(&b.to_string())),
    }
}

fn cmp_f64(a: f64, b: f64) -> Option<Ordering> {
    if (a - b).abs() < f64::EPSILON {
        Some(Ordering::Equal)
    } else {
        a.partial_cmp(&b)
    }
}

/// Coercing equality between a context value and text taken from a path.
///
/// Used by filter indices (`items[2,code]`), where the wanted value is always
/// written as text but the field may hold a number or a boolean.
pub fn loose_eq(value: &Value, text: &str) -> bool {
    match value {
        Value::String(s) => s == text,
        Value::Number(n) => coerce_number(text) == *n,
        Value::Bool(b) => coerce_number(text) == f64::from(u8::from(*b)),
        Value::Sequence(items) => {
            let joined: Vec<String> = items.iter().map(Value::to_string).collect();
            joined.join(",") == text
        }
        Value::Null | Value::Mapping(_) | Value::Callable(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_compare_as_numbers() {
        assert!(cmp_values(&Value::from(15.0), &Value::from("10"), |o| o.is_gt()));
        assert!(cmp_values(&Value::from("9"), &Value::from(10.0), |o| o.is_lt()));
        assert!(cmp_values(&Value::from("abc"), &Value::from("abd"), |o| o.is_lt()));
    }

    #[test]
    fn loose_equality_coerces_scalars() {
        assert!(loose_eq(&Value::from(2.0), "2"));
        assert!(loose_eq(&Value::from("2"), "2"));
        assert!(loose_eq(&Value::from(true), "1"));
        assert!(!loose_eq(&Value::from(true), "true"));
        assert!(!loose_eq(&Value::Null, "null"));
        assert!(!loose_eq(&Value::from("02"), "2"));
    }
}
