use crate::errors::{EvalError, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Separator between opener and closer in a delimiter format string (`{...}`).
const FORMAT_SEPARATOR: &str = "...";

/// A validated opener/closer pair marking placeholder regions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Delimiters {
    /// Both tokens must be non-empty and different.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self> {
        let (open, close) = (open.into(), close.into());
        if open.is_empty() || close.is_empty() {
            return Err(EvalError::Delimiter("opener and closer must not be empty".into()));
        }
        if open == close {
            return Err(EvalError::Delimiter(
                "start and end tokens cannot be identical".into(),
            ));
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// `inner` surrounded by the opener and closer.
    pub fn wrap(&self, inner: &str) -> String {
        format!("{}{}{}", self.open, inner, self.close)
    }

    /// Raw inner text of every balanced top-level region, left to right.
    ///
    /// Nested regions stay inside their parent's text. An opener that is
    /// never closed yields nothing; scanning resumes right after it so that
    /// balanced regions following it are still found. Closers without an
    /// opener are ignored.
    pub fn match_balanced<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let (open, close) = (self.open.as_str(), self.close.as_str());
        let mut spans = Vec::new();
        let mut resume = 0;
        loop {
            let mut depth = 0usize;
            let mut start = resume;
            let mut i = resume;
            while i < text.len() {
                let rest = &text[i..];
                if rest.starts_with(open) {
                    if depth == 0 {
                        start = i + open.len();
                    }
                    depth += 1;
                    i += open.len();
                } else if rest.starts_with(close) {
                    if depth > 0 {
                        depth -= 1;
                        if depth == 0 {
                            spans.push(&text[start..i]);
                        }
                    }
                    i += close.len();
                } else {
                    i += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
            if depth == 0 {
                break;
            }
            resume = start;
        }
        tracing::trace!(count = spans.len(), "matched placeholder regions");
        spans
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self { open: "{".into(), close: "}".into() }
    }
}

/// Parses `"<open>...<close>"`, e.g. `"{...}"` or `"<<...>>"`.
impl FromStr for Delimiters {
    type Err = EvalError;

    fn from_str(format: &str) -> Result<Self> {
        // The opener is at least one character long, so `....}` reads as `.` and `}`.
        let split = format
            .char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .find(|&i| format[i..].starts_with(FORMAT_SEPARATOR));
        match split {
            Some(i) => Delimiters::new(&format[..i], &format[i + FORMAT_SEPARATOR.len()..]),
            None => Err(EvalError::Delimiter(format!(
                "format `{format}` must include start and end tokens separated by '{FORMAT_SEPARATOR}'"
            ))),
        }
    }
}

impl TryFrom<String> for Delimiters {
    type Error = EvalError;

    fn try_from(format: String) -> Result<Self> {
        format.parse()
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.open, FORMAT_SEPARATOR, self.close)
    }
}

/// One-shot form of [`Delimiters::match_balanced`].
pub fn match_balanced<'t>(text: &'t str, open: &str, close: &str) -> Result<Vec<&'t str>> {
    Ok(Delimiters::new(open, close)?.match_balanced(text))
}
