//! Path resolution: `ident('.'ident | '[' index ']')*`.
//!
//! Index forms: a non-negative integer, `first`, `last`, or a filter
//! `value,field1,field2,...` selecting the first element whose nested field
//! chain loosely equals `value`. Every miss resolves to `None`.

use crate::comparison::loose_eq;
use crate::parser::Parser;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Segment<'p> {
    Key(&'p str),
    Index(Index<'p>),
}

#[derive(Debug, Clone, PartialEq)]
enum Index<'p> {
    Position(usize),
    First,
    Last,
    Filter { wanted: &'p str, fields: Vec<&'p str> },
    /// Text that is none of the above, e.g. `[-1]` or `[abc]`.
    Invalid,
}

/// Resolve `path` against `context`, borrowing the result from it.
pub fn resolve<'v>(context: &'v Value, path: &str) -> Option<&'v Value> {
    let segments = parse_path(path)?;
    segments
        .iter()
        .try_fold(context, |current, segment| step(current, segment))
}

fn step<'v>(current: &'v Value, segment: &Segment<'_>) -> Option<&'v Value> {
    match segment {
        Segment::Key(key) => current.get(key),
        Segment::Index(index) => {
            let items = current.as_sequence()?;
            match index {
                Index::Position(i) => items.get(*i),
                Index::First => items.first(),
                Index::Last => items.last(),
                Index::Filter { wanted, fields } => items
                    .iter()
                    .find(|item| field_chain(item, fields).is_some_and(|v| loose_eq(v, wanted))),
                Index::Invalid => None,
            }
        }
    }
}

fn field_chain<'v>(item: &'v Value, fields: &[&str]) -> Option<&'v Value> {
    fields.iter().try_fold(item, |v, field| v.get(field))
}

/// `None` for text that does not follow the grammar (unterminated bracket,
/// junk after `]`).
fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut p = Parser::new(path);
    let mut segments = vec![Segment::Key(p.take_while(|c| c != '.' && c != '['))];
    while !p.eof() {
        if p.consume_char('.') {
            segments.push(Segment::Key(p.take_while(|c| c != '.' && c != '[')));
        } else if p.consume_char('[') {
            let content = p.capture_until(']').ok()?;
            p.expect(']').ok()?;
            segments.push(Segment::Index(parse_index(content)));
        } else {
            return None;
        }
    }
    Some(segments)
}

fn parse_index(content: &str) -> Index<'_> {
    if content.contains(',') {
        let mut parts = content.split(',');
        let wanted = parts.next().unwrap_or_default();
        return Index::Filter { wanted, fields: parts.collect() };
    }
    match content {
        "first" => Index::First,
        "last" => Index::Last,
        other => other.trim().parse().map_or(Index::Invalid, Index::Position),
    }
}
