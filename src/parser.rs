// src/parser.rs
use crate::errors::{EvalError, Result};
use crate::value::Value;

/// Character cursor over a borrowed string.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn parse_number_literal(&mut self) -> Result<Value> {
        let start = self.i;
        if self.peek_char() == Some('-') {
            self.i += 1;
        }
        self.take_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.i += 1;
            self.take_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mark = self.i;
            self.i += 1;
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.i += 1;
            }
            // `1e` alone is not an exponent.
            if self.take_while(|c| c.is_ascii_digit()).is_empty() {
                self.i = mark;
            }
        }
        let s = &self.s[start..self.i];
        if s.is_empty() || s == "-" {
            return Err(EvalError::Parse("number expected".into()));
        }
        s.parse::<f64>()
            .map(Value::Number)
            .map_err(|_| EvalError::Parse(format!("bad number `{s}`")))
    }

    pub fn parse_quoted_string(&mut self) -> Result<String> {
        let quote = self
            .peek_char()
            .ok_or_else(|| EvalError::Parse("string expected".into()))?;
        if quote != '\'' && quote != '"' {
            return Err(EvalError::Parse("expected quoted string".into()));
        }
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(EvalError::Parse("unterminated string".into()))
    }

    /// Everything up to (not including) `end`; fails if `end` never appears.
    pub fn capture_until(&mut self, end: char) -> Result<&'a str> {
        let start = self.i;
        let found = self.s[start..].find(end);
        match found {
            Some(offset) => {
                self.i = start + offset;
                Ok(&self.s[start..self.i])
            }
            None => {
                self.i = self.s.len();
                Err(EvalError::Parse(format!("expected '{end}'")))
            }
        }
    }

    /// Consume characters while `pred` holds and return them.
    pub fn take_while<P>(&mut self, pred: P) -> &'a str
    where
        P: Fn(char) -> bool,
    {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.i += c.len_utf8();
        }
        &self.s[start..self.i]
    }

    pub fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(EvalError::Parse(format!("expected '{c}'")))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn consume_str(&mut self, lit: &str) -> bool {
        if self.peek_str(lit) {
            self.i += lit.len();
            true
        } else {
            false
        }
    }

    /// Consume `word` only when it is not the prefix of a longer identifier.
    pub fn consume_keyword(&mut self, word: &str) -> bool {
        let rest = &self.s[self.i..];
        let bounded = rest.strip_prefix(word).is_some_and(|after| {
            !after.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$')
        });
        if bounded {
            self.i += word.len();
        }
        bounded
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    pub fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}
