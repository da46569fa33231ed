//! Sequence and JSON helpers.
//!
//! `ArrayConcat` and `ArraySum` are meant for `#@`/`##@`: their trailing
//! arguments are a raw sub-template rendered once per element.

use super::{Call, Function, Registry};
use crate::errors::{EvalError, Result};
use crate::value::{coerce_number, Value};
use itertools::Itertools;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub(crate) fn register(registry: &mut Registry) {
    registry.register("ArrayConcat", ArrayConcat);
    registry.register("ArraySum", ArraySum);
    registry.register("Split", Split);
    registry.register("Json", Json);
}

/// Elements of the sequence named by the first argument, and the sub-template
/// made of the remaining arguments (re-joined on `|`).
fn each_element(call: &Call<'_>) -> Option<(Vec<Value>, String)> {
    let context = call.context()?;
    let (name, rest) = call.args().split_first()?;
    let items = match call.resolve(context, name) {
        Value::Sequence(items) => items,
        _ => Vec::new(),
    };
    Some((items, rest.join("|")))
}

/// Render the sub-template for every element and concatenate the results.
pub struct ArrayConcat;
impl Function for ArrayConcat {
    fn arity(&self) -> RangeInclusive<usize> { 2..=usize::MAX }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let Some((items, template)) = each_element(call) else {
            return Ok(Value::Null);
        };
        let out = items.iter().map(|item| call.parse(&template, item)).join("");
        Ok(Value::String(out))
    }
}

/// Render the sub-template for every element and add up the numeric results
/// in decimal arithmetic, so `0.1 + 0.2` is exactly `0.3`.
///
/// A part outside `Decimal`'s range (about 7.9e28, or more than 28 fractional
/// digits) switches the rest of the sum to `f64`.
pub struct ArraySum;
impl Function for ArraySum {
    fn arity(&self) -> RangeInclusive<usize> { 2..=usize::MAX }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let Some((items, template)) = each_element(call) else {
            return Ok(Value::Null);
        };
        let mut total = Total::Exact(Decimal::ZERO);
        for item in &items {
            let rendered = call.parse(&template, item);
            let text = rendered.trim();
            let n = coerce_number(text);
            if text.is_empty() || n.is_nan() {
                tracing::debug!(part = text, "ArraySum skipped a non-numeric part");
                continue;
            }
            total = match total {
                Total::Exact(sum) => match to_decimal(text).and_then(|d| sum.checked_add(d)) {
                    Some(sum) => Total::Exact(sum),
                    None => {
                        tracing::warn!(part = text, "ArraySum part exceeds decimal range, summing as f64");
                        Total::Float(sum.to_f64().unwrap_or(0.0) + n)
                    }
                },
                Total::Float(sum) => Total::Float(sum + n),
            };
        }
        Ok(Value::String(match total {
            Total::Exact(sum) => sum.normalize().to_string(),
            Total::Float(sum) => Value::Number(sum).to_string(),
        }))
    }
}

enum Total {
    Exact(Decimal),
    Float(f64),
}

fn to_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok()
}

/// `Split|text|delimiter`: every non-blank part decoded as JSON; parts that
/// are not valid JSON are skipped.
pub struct Split;
impl Function for Split {
    fn arity(&self) -> RangeInclusive<usize> { 2..=2 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        let items = args[0]
            .split(args[1].as_str())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| match serde_json::from_str::<Value>(part) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::debug!(part, error = %e, "skipping part that is not JSON");
                    None
                }
            })
            .collect();
        Ok(Value::Sequence(items))
    }
}

/// `Json|parse|source` or `Json|stringify|source`.
///
/// With a context (`!@`, `#@`, `##@`) `source` is a path, optionally wrapped
/// in delimiters. Under `@` it is the already-substituted text itself.
/// Undecodable input resolves to null.
pub struct Json;
impl Function for Json {
    fn arity(&self) -> RangeInclusive<usize> { 2..=2 }
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        let args = call.args();
        let source = match call.context() {
            Some(context) => {
                let d = call.delimiters;
                let key = args[1]
                    .strip_prefix(d.open())
                    .and_then(|k| k.strip_suffix(d.close()))
                    .unwrap_or(&args[1]);
                call.resolve(context, key)
            }
            None => Value::String(args[1].clone()),
        };
        match args[0].to_lowercase().as_str() {
            "parse" => Ok(source
                .as_str()
                .and_then(|text| serde_json::from_str::<Value>(text).ok())
                .unwrap_or_default()),
            "stringify" => serde_json::to_string(&source)
                .map(Value::String)
                .map_err(|e| EvalError::Runtime(e.to_string())),
            _ => Ok(Value::Null),
        }
    }
}
