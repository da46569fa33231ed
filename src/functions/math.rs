//! Numeric helpers. Arguments arrive as text and are coerced with
//! [`coerce_number`]; blank text counts as zero.

use super::{Call, Function, Registry};
use crate::errors::Result;
use crate::value::{coerce_number, Value};
use std::ops::RangeInclusive;

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Number", ToNumber);
    registry.register("Sum", Sum);
    registry.register("Math", Math);
}

/// Number from text, or null when the text is not numeric.
pub struct ToNumber;
impl Function for ToNumber {
    fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let n = coerce_number(call.arg(0).unwrap_or_default());
        Ok(if n.is_nan() { Value::Null } else { Value::Number(n) })
    }
}

pub struct Sum;
impl Function for Sum {
    fn arity(&self) -> RangeInclusive<usize> { 2..=2 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        Ok(Value::Number(coerce_number(&args[0]) + coerce_number(&args[1])))
    }
}

/// `Math|op|a|b` with `op` one of `+ - * / % **`; unknown operators give null.
pub struct Math;
impl Function for Math {
    fn arity(&self) -> RangeInclusive<usize> { 3..=3 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        let (a, b) = (coerce_number(&args[1]), coerce_number(&args[2]));
        let result = match args[0].as_str() {
            "+" => a + b,
            "-" => a - b,
            "*" => a * b,
            "/" => a / b,
            "%" => a % b,
            "**" => a.powf(b),
            _ => return Ok(Value::Null),
        };
        Ok(Value::Number(result))
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Templater;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn arithmetic() {
        let t = Templater::new();
        let data = Value::Null;
        assert_eq!(t.parse("[@Sum|5|3]", &data, None), "[@Sum|5|3]");
        assert_eq!(t.parse("{@Sum|5|3}", &data, None), "8");
        assert_eq!(t.parse("{@Sum||5}", &data, None), "5");
        assert_eq!(t.parse("{@Math|**|2|10}", &data, None), "1024");
        assert_eq!(t.parse("{@Math|/|5|0}", &data, None), "Infinity");
        assert_eq!(t.parse("{@Math|invalid|5|3}", &data, None), "");
        assert_eq!(t.parse("{@Math|+|1}", &data, None), "");
        assert_eq!(t.parse("{@Number|abc}", &data, None), "");
    }

    #[test]
    fn evaluate_keeps_numbers_numeric() {
        let t = Templater::new();
        assert_eq!(t.evaluate("@Math|+|10|5", &Value::Null, None), Some(Value::Number(15.0)));
        assert_eq!(t.evaluate("@Number| 2.5 ", &Value::Null, None), Some(Value::Number(2.5)));
    }
}
