//! String templating over tree-shaped data.
//!
//! ```
//! use path_templater::{Templater, Value};
//! use serde_json::json;
//!
//! let t = Templater::new();
//! let data = Value::from(json!({"user": {"name": "Ann"}, "items": [{"id": 1}, {"id": 2}]}));
//! assert_eq!(t.parse("Hello {user.name}!", &data, None), "Hello Ann!");
//! assert_eq!(t.parse("{items[last].id}", &data, None), "2");
//! assert_eq!(t.evaluate("items[first]", &data, None), Some(Value::from(json!({"id": 1}))));
//! ```

pub mod errors;
pub mod value;
pub mod delimiter;
pub mod path;
pub mod cache;
pub mod dispatch;
pub mod functions;  // plugin model
pub mod condition;
pub mod context;
pub mod engine;
mod comparison;
mod parser;

pub use cache::{fingerprint, CacheMode};
pub use context::Options;
pub use delimiter::{match_balanced, Delimiters};
pub use dispatch::{Convention, FunctionCall};
pub use engine::Templater;
pub use errors::{EvalError, Result};
pub use functions::{Call, Function, Registry};
pub use value::{Callable, Value};

/// Convenience: render `template` with a default engine.
pub fn parse(template: &str, data: &Value) -> String {
    Templater::new().parse(template, data, None)
}

/// Convenience: evaluate `expression` with a default engine.
pub fn evaluate(expression: &str, data: &Value) -> Option<Value> {
    Templater::new().evaluate(expression, data, None)
}
