//! Boolean conditions for `If`.
//!
//! By the time a condition is evaluated its placeholders have already been
//! substituted, so it only ever sees literals:
//!
//! ```text
//! or      := and (("||" | "or") and)*
//! and     := not (("&&" | "and") not)*
//! not     := "!" not | compare
//! compare := "(" or ")" | operand (op operand)?
//! op      := "===" | "!==" | "==" | "!=" | "<=" | ">=" | "<" | ">"
//! operand := quoted | number | true | false | null | undefined | word
//! ```
//!
//! A bare word is a string literal. Nothing is ever executed.

use crate::comparison::cmp_values;
use crate::errors::{EvalError, Result};
use crate::parser::Parser;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare(Op, Value, Value),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
    Truthy(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Longest spellings first so `===` is not read as `==` followed by `=`.
const OPERATORS: [(&str, Op); 8] = [
    ("===", Op::StrictEq),
    ("!==", Op::StrictNe),
    ("==", Op::Eq),
    ("!=", Op::Ne),
    ("<=", Op::Lte),
    (">=", Op::Gte),
    ("<", Op::Lt),
    (">", Op::Gt),
];

/// Parse and evaluate `expr`. Blank input is false; anything left over after
/// a complete condition is an error.
pub fn evaluate(expr: &str) -> Result<bool> {
    if expr.trim().is_empty() {
        return Ok(false);
    }
    Ok(parse(expr)?.holds())
}

pub fn parse(expr: &str) -> Result<Condition> {
    let mut parser = Parser::new(expr);
    let condition = parse_or(&mut parser)?;
    parser.skip_ws();
    if !parser.eof() {
        return Err(EvalError::Parse(format!("unexpected input in condition `{expr}`")));
    }
    Ok(condition)
}

fn parse_or(parser: &mut Parser) -> Result<Condition> {
    let mut left = parse_and(parser)?;
    loop {
        parser.skip_ws();
        if parser.consume_str("||") || parser.consume_keyword("or") {
            let right = parse_and(parser)?;
            left = Condition::Or(Box::new(left), Box::new(right));
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_and(parser: &mut Parser) -> Result<Condition> {
    let mut left = parse_not(parser)?;
    loop {
        parser.skip_ws();
        if parser.consume_str("&&") || parser.consume_keyword("and") {
            let right = parse_not(parser)?;
            left = Condition::And(Box::new(left), Box::new(right));
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_not(parser: &mut Parser) -> Result<Condition> {
    parser.skip_ws();
    if !parser.peek_str("!=") && parser.consume_char('!') {
        let inner = parse_not(parser)?;
        Ok(Condition::Not(Box::new(inner)))
    } else {
        parse_compare(parser)
    }
}

fn parse_compare(parser: &mut Parser) -> Result<Condition> {
    parser.skip_ws();
    if parser.consume_char('(') {
        let inner = parse_or(parser)?;
        parser.skip_ws();
        parser.expect(')')?;
        return Ok(inner);
    }
    let left = parse_operand(parser)?;
    parser.skip_ws();
    let op = OPERATORS
        .iter()
        .find(|(spelling, _)| parser.consume_str(spelling))
        .map(|(_, op)| *op);
    match op {
        Some(op) => {
            let right = parse_operand(parser)?;
            Ok(Condition::Compare(op, left, right))
        }
        None => Ok(Condition::Truthy(left)),
    }
}

fn parse_operand(parser: &mut Parser) -> Result<Value> {
    parser.skip_ws();
    match parser.peek_char() {
        Some('"') | Some('\'') => return parser.parse_quoted_string().map(Value::String),
        Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => {
            return parser.parse_number_literal();
        }
        None => return Err(EvalError::Parse("operand expected".into())),
        _ => {}
    }
    if parser.consume_keyword("true") {
        return Ok(Value::Bool(true));
    }
    if parser.consume_keyword("false") {
        return Ok(Value::Bool(false));
    }
    if parser.consume_keyword("null") || parser.consume_keyword("undefined") {
        return Ok(Value::Null);
    }
    let word = parser.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if word.is_empty() {
        return Err(EvalError::Parse("operand expected".into()));
    }
    Ok(Value::from(word))
}

impl Condition {
    pub fn holds(&self) -> bool {
        match self {
            Condition::Compare(op, a, b) => compare(*op, a, b),
            Condition::And(l, r) => l.holds() && r.holds(),
            Condition::Or(l, r) => l.holds() || r.holds(),
            Condition::Not(inner) => !inner.holds(),
            Condition::Truthy(v) => v.is_truthy(),
        }
    }
}

fn compare(op: Op, a: &Value, b: &Value) -> bool {
    match op {
        Op::StrictEq => a.kind() == b.kind() && cmp_values(a, b, |o| o.is_eq()),
        Op::StrictNe => !compare(Op::StrictEq, a, b),
        Op::Eq => cmp_values(a, b, |o| o.is_eq()),
        Op::Ne => !cmp_values(a, b, |o| o.is_eq()),
        Op::Lt => cmp_values(a, b, |o| o.is_lt()),
        Op::Lte => cmp_values(a, b, |o| o.is_le()),
        Op::Gt => cmp_values(a, b, |o| o.is_gt()),
        Op::Gte => cmp_values(a, b, |o| o.is_ge()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn comparisons() {
        assert!(evaluate("15>=10").unwrap());
        assert!(evaluate("15 > 9").unwrap());
        assert!(!evaluate("5 < 3").unwrap());
        assert!(evaluate("\"Product A\"==\"Product A\"").unwrap());
        assert!(evaluate("'a' != 'b'").unwrap());
        assert!(evaluate("10 == '10'").unwrap());
        assert!(!evaluate("10 === '10'").unwrap());
        assert!(evaluate("10 !== '10'").unwrap());
    }

    #[test]
    fn exponent_literals() {
        assert!(evaluate("1e+21 > 100").unwrap());
        assert!(evaluate("2.5E3 == 2500").unwrap());
        assert!(evaluate("1.5e-7 < 0.000001").unwrap());
        assert_eq!(
            parse("-4e2").unwrap(),
            Condition::Truthy(Value::Number(-400.0))
        );
    }

    #[test]
    fn connectives_and_precedence() {
        assert!(evaluate("1 < 2 && 3 < 4").unwrap());
        assert!(evaluate("1 > 2 || 3 < 4").unwrap());
        assert!(evaluate("true or false and false").unwrap());
        assert!(!evaluate("!(1 < 2)").unwrap());
        assert!(evaluate("!false").unwrap());
    }

    #[test]
    fn literals_and_bare_words() {
        assert!(!evaluate("").unwrap());
        assert!(!evaluate("null").unwrap());
        assert!(!evaluate("undefined").unwrap());
        assert!(!evaluate("0").unwrap());
        assert!(evaluate("active").unwrap());
        assert!(evaluate("active == active").unwrap());
        assert_eq!(
            parse("order").unwrap(),
            Condition::Truthy(Value::from("order"))
        );
    }

    #[test]
    fn code_is_rejected() {
        assert!(evaluate("process.exit()").is_err());
        assert!(evaluate("1 +").is_err());
        assert!(evaluate("(1 < 2").is_err());
        assert!(evaluate("a; b").is_err());
    }
}
