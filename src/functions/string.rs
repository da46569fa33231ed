//! Text and logic helpers.

use super::{Call, Function, Registry};
use crate::condition;
use crate::errors::{EvalError, Result};
use crate::value::{coerce_number, Value};
use std::ops::RangeInclusive;

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Bool", Bool);
    registry.register("Not", Not);
    registry.register("IsNull", IsNull);
    registry.register("If", If);
    registry.register("Switch", Switch { insensitive: false });
    registry.register("SwitchInsensitive", Switch { insensitive: true });
    registry.register("Contains", Contains);
    registry.register("PadStart", Pad { at_start: true });
    registry.register("PadEnd", Pad { at_start: false });
}

fn text_truthy(text: &str) -> bool {
    !matches!(text, "false" | "" | "0" | "undefined" | "null")
}

/// `"true"` / `"false"` from the usual falsy spellings.
pub struct Bool;
impl Function for Bool {
    fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let truthy = text_truthy(call.arg(0).unwrap_or_default());
        Ok(Value::String(truthy.to_string()))
    }
}

pub struct Not;
impl Function for Not {
    fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let truthy = text_truthy(call.arg(0).unwrap_or_default());
        Ok(Value::String((!truthy).to_string()))
    }
}

/// `IsNull|value|fallback` or `IsNull|value|when_set|when_blank`.
pub struct IsNull;
impl Function for IsNull {
    fn arity(&self) -> RangeInclusive<usize> { 2..=3 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        let blank = args[0].trim().is_empty();
        let picked = match (args.len(), blank) {
            (2, true) => &args[1],
            (2, false) => &args[0],
            (_, true) => &args[2],
            (_, false) => &args[1],
        };
        Ok(Value::String(picked.clone()))
    }
}

/// `If|condition|then|else` with a condition in the safe grammar of
/// [`condition`]. A condition that does not parse counts as false.
pub struct If;
impl Function for If {
    fn arity(&self) -> RangeInclusive<usize> { 2..=3 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let expr = call.arg(0).unwrap_or_default();
        let holds = condition::evaluate(expr).unwrap_or_else(|e| {
            tracing::warn!(condition = expr, error = %e, "condition rejected");
            false
        });
        let branch = if holds { call.arg(1) } else { call.arg(2) };
        Ok(branch.map_or(Value::Null, Value::from))
    }
}

/// `Switch|value|case:result|...|default:result`. Scanning stops at the first
/// empty case; a case without `:` is returned as-is.
pub struct Switch {
    insensitive: bool,
}
impl Function for Switch {
    fn arity(&self) -> RangeInclusive<usize> { 2..=usize::MAX }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        let subject = args[0].as_str();
        for case in args[1..].iter().take_while(|c| !c.is_empty()) {
            let Some((when, result)) = case.split_once(':').filter(|(w, _)| !w.is_empty()) else {
                return Ok(Value::String(case.clone()));
            };
            let hit = when == "default"
                || if self.insensitive {
                    when.to_lowercase() == subject.to_lowercase()
                } else {
                    when == subject
                };
            if hit {
                return Ok(Value::from(result));
            }
        }
        Ok(Value::Null)
    }
}

/// `Contains|haystack|needle[|when_found[|when_missing]]`, case-insensitive.
pub struct Contains;
impl Function for Contains {
    fn arity(&self) -> RangeInclusive<usize> { 2..=4 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        let found = args[0].to_lowercase().contains(&args[1].to_lowercase());
        let picked = match (found, args.len()) {
            (true, 2) => Some(&args[0]),
            (true, _) => args.get(2),
            (false, 4) => args.get(3),
            (false, _) => None,
        };
        Ok(picked.map_or(Value::Null, |s| Value::String(s.clone())))
    }
}

/// Longest text `PadStart`/`PadEnd` will build, in characters.
pub const MAX_PAD_LENGTH: usize = (1 << 29) - 24;

/// `PadStart|text|length[|fill]` and `PadEnd|...`; `fill` defaults to a space.
///
/// A length above [`MAX_PAD_LENGTH`] is an error, so the placeholder is kept.
pub struct Pad {
    at_start: bool,
}
impl Function for Pad {
    fn arity(&self) -> RangeInclusive<usize> { 2..=3 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let text = call.arg(0).unwrap_or_default();
        let fill = call.arg(2).unwrap_or(" ");
        let target = coerce_number(call.arg(1).unwrap_or_default());
        let current = text.chars().count();
        if fill.is_empty() || !target.is_finite() || target <= current as f64 {
            return Ok(Value::from(text));
        }
        if target > MAX_PAD_LENGTH as f64 {
            return Err(EvalError::Runtime(format!(
                "pad length {target} exceeds {MAX_PAD_LENGTH}"
            )));
        }
        let padding: String = fill.chars().cycle().take(target as usize - current).collect();
        Ok(Value::String(if self.at_start {
            format!("{padding}{text}")
        } else {
            format!("{text}{padding}")
        }))
    }
}
