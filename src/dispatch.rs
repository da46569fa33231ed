//! Recognising function calls inside placeholder bodies.
//!
//! A body is a call when it starts with one of the convention prefixes and
//! has a `|` after the first character. Arguments are split on every `|`;
//! there is no escape, so an argument can never contain a literal `|`.

/// How a function is invoked, selected by the body's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
    /// `@Name|...` - arguments only.
    Plain,
    /// `!@Name|...` - primary context and raw arguments.
    Legacy,
    /// `#@Name|...` - primary context and raw, unresolved arguments.
    Each,
    /// `##@Name|...` - secondary context, primary context, raw arguments.
    Dual,
}

impl Convention {
    /// Checked in this order; `##@` must win over `#@`.
    const ALL: [Convention; 4] = [
        Convention::Legacy,
        Convention::Dual,
        Convention::Each,
        Convention::Plain,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Convention::Plain => "@",
            Convention::Legacy => "!@",
            Convention::Each => "#@",
            Convention::Dual => "##@",
        }
    }

    /// Convention of `body`, if it is a function call at all.
    pub fn detect(body: &str) -> Option<Convention> {
        if !body.find('|').is_some_and(|i| i > 0) {
            return None;
        }
        Convention::ALL
            .into_iter()
            .find(|c| body.starts_with(c.prefix()))
    }

    /// Whether placeholders nested in the arguments are left for the callee.
    pub fn keeps_raw_arguments(self) -> bool {
        !matches!(self, Convention::Plain)
    }
}

/// A parsed call: `{ name, convention, arguments }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall<'b> {
    pub name: &'b str,
    pub convention: Convention,
    pub args: Vec<&'b str>,
}

impl<'b> FunctionCall<'b> {
    pub fn parse(body: &'b str) -> Option<Self> {
        let convention = Convention::detect(body)?;
        let mut parts = body.split('|');
        let head = parts.next()?;
        Some(FunctionCall {
            name: &head[convention.prefix().len()..],
            convention,
            args: parts.collect(),
        })
    }
}
