//! The templating engine: placeholder substitution (`parse`) and
//! type-preserving single-expression evaluation (`evaluate`).
//!
//! An engine owns its function registry and path cache. Neither is shared
//! between instances, and the cache uses interior mutability without locking,
//! so a `Templater` is confined to one thread.

use crate::cache::Cache;
use crate::context::Options;
use crate::delimiter::Delimiters;
use crate::dispatch::{Convention, FunctionCall};
use crate::errors::Result;
use crate::functions::{Call, Function, Registry};
use crate::value::Value;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};

static NULL: Value = Value::Null;

/// Word introducing the inline conditional `exist|cond,then,else`.
const EXIST: &str = "exist";

pub struct Templater {
    options: Options,
    registry: Registry,
    cache: RefCell<Cache>,
    depth: Cell<usize>,
}

impl Default for Templater {
    fn default() -> Self {
        Self::new()
    }
}

impl Templater {
    /// Engine with default options and every built-in function registered.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let cache = Cache::new(options.cache, options.cache_mode);
        Self {
            options,
            registry: Registry::with_builtins(),
            cache: RefCell::new(cache),
            depth: Cell::new(0),
        }
    }

    /// Replace the whole function table.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn register<F: Function + 'static>(&mut self, name: impl Into<String>, function: F) {
        self.registry.register(name, function);
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry.register_fn(name, function);
    }

    /// Substitute every placeholder of `template` using the configured
    /// delimiters. `other` is the secondary context seen by `##@` functions.
    pub fn parse(&self, template: &str, data: &Value, other: Option<&Value>) -> String {
        self.render(template, data, other, &self.options.delimiters)
            .to_string()
    }

    /// [`Templater::parse`] with an explicit opener and closer.
    pub fn parse_with(
        &self,
        template: &str,
        data: &Value,
        other: Option<&Value>,
        open: &str,
        close: &str,
    ) -> Result<String> {
        let delimiters = Delimiters::new(open, close)?;
        Ok(self.render(template, data, other, &delimiters).to_string())
    }

    /// Like [`Templater::parse`], but a template that is exactly one
    /// placeholder yields the placeholder's value with its kind intact.
    pub fn parse_value(&self, template: &str, data: &Value, other: Option<&Value>) -> Value {
        self.render(template, data, other, &self.options.delimiters)
    }

    /// Resolve one expression (a path or a function call, no delimiters) and
    /// return its native value.
    ///
    /// `None` means the expression named an unregistered function. A path
    /// that misses and a function that fails both give `Some(Value::Null)`.
    pub fn evaluate(&self, expression: &str, data: &Value, other: Option<&Value>) -> Option<Value> {
        let expression = expression.trim();
        let Some(call) = FunctionCall::parse(expression) else {
            return Some(self.resolve(data, expression));
        };
        match self.dispatch(&call, data, other, &self.options.delimiters) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                tracing::warn!(function = call.name, expression, "function not registered");
                None
            }
            Err(e) => {
                tracing::warn!(function = call.name, error = %e, "function failed");
                Some(Value::Null)
            }
        }
    }

    /// Path lookup through the cache. Misses give `Value::Null`.
    pub fn resolve(&self, data: &Value, path: &str) -> Value {
        self.cache.borrow_mut().resolve(data, path)
    }

    pub fn enable_cache(&self) {
        self.cache.borrow_mut().enable();
    }

    /// Stop caching and drop every entry.
    pub fn disable_cache(&self) {
        self.cache.borrow_mut().disable();
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache.borrow().is_enabled()
    }

    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn cache_keys(&self) -> Vec<String> {
        self.cache.borrow().keys()
    }

    pub(crate) fn render(
        &self,
        template: &str,
        data: &Value,
        other: Option<&Value>,
        delimiters: &Delimiters,
    ) -> Value {
        let Some(_guard) = self.enter() else {
            tracing::warn!(template, max_depth = ?self.options.max_depth, "nesting limit reached");
            return Value::from(template);
        };
        let mut result = Value::from(template);
        for raw in delimiters.match_balanced(template) {
            let Some(value) = self.resolve_placeholder(raw, data, other, delimiters) else {
                continue;
            };
            let span = delimiters.wrap(raw);
            result = match result {
                Value::String(text) if text == span => value,
                current => Value::String(current.to_string().replacen(&span, &value.to_string(), 1)),
            };
        }
        result
    }

    /// Value for one placeholder body, or `None` to leave it untouched.
    fn resolve_placeholder(
        &self,
        raw: &str,
        data: &Value,
        other: Option<&Value>,
        delimiters: &Delimiters,
    ) -> Option<Value> {
        // `!@` bodies are dispatched before any nested placeholder is touched.
        let legacy = FunctionCall::parse(raw).filter(|c| c.convention == Convention::Legacy);
        if let Some(call) = legacy {
            return self.call_in_template(&call, raw, data, other, delimiters);
        }

        let body = match Convention::detect(raw) {
            Some(c) if c.keeps_raw_arguments() => Cow::Borrowed(raw),
            _ if raw.contains(delimiters.open()) => {
                Cow::Owned(self.render(raw, data, other, delimiters).to_string())
            }
            _ => Cow::Borrowed(raw),
        };
        match FunctionCall::parse(&body) {
            Some(call) if call.convention != Convention::Legacy => {
                self.call_in_template(&call, &body, data, other, delimiters)
            }
            _ => Some(self.lookup(&body, data, other, delimiters)),
        }
    }

    fn call_in_template(
        &self,
        call: &FunctionCall<'_>,
        body: &str,
        data: &Value,
        other: Option<&Value>,
        delimiters: &Delimiters,
    ) -> Option<Value> {
        match self.dispatch(call, data, other, delimiters) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                tracing::warn!(function = call.name, body, "function not registered");
                Some(Value::String(delimiters.wrap(body)))
            }
            Err(e) => {
                tracing::warn!(function = call.name, error = %e, "function failed, placeholder kept");
                None
            }
        }
    }

    /// Invoke a registered function. `Ok(None)` when `call.name` is unknown.
    fn dispatch(
        &self,
        call: &FunctionCall<'_>,
        data: &Value,
        other: Option<&Value>,
        delimiters: &Delimiters,
    ) -> Result<Option<Value>> {
        let Some(function) = self.registry.get(call.name) else {
            return Ok(None);
        };
        if !function.arity().contains(&call.args.len()) {
            tracing::debug!(function = call.name, given = call.args.len(), "argument count out of range");
            return Ok(Some(Value::Null));
        }
        let invocation = Call {
            engine: self,
            delimiters,
            convention: call.convention,
            primary: data,
            secondary: other.unwrap_or(&NULL),
            args: call.args.iter().map(|a| a.to_string()).collect(),
        };
        function.call(&invocation).map(Some)
    }

    /// A body that is not a function call: a path, or `exist|cond,then,else`.
    /// Any other body containing `|` resolves to null.
    fn lookup(&self, body: &str, data: &Value, other: Option<&Value>, delimiters: &Delimiters) -> Value {
        match body.split_once('|') {
            None => self.resolve(data, body),
            Some((head, params)) if head.eq_ignore_ascii_case(EXIST) => {
                self.exist(params, data, other, delimiters)
            }
            Some(_) => Value::Null,
        }
    }

    /// `cond,then,else`: a quoted branch is a sub-template, any other branch
    /// a path. Anything but exactly three parts is null.
    fn exist(&self, params: &str, data: &Value, other: Option<&Value>, delimiters: &Delimiters) -> Value {
        let parts: Vec<&str> = params.split(',').collect();
        let [condition, then, otherwise] = parts.as_slice() else {
            return Value::Null;
        };
        let branch = if self.resolve(data, condition).is_truthy() { then } else { otherwise };
        match quoted_inner(branch) {
            Some(inner) => Value::String(self.render(inner, data, other, delimiters).to_string()),
            None => self.resolve(data, branch),
        }
    }

    fn enter(&self) -> Option<DepthGuard<'_>> {
        let depth = self.depth.get();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return None;
        }
        self.depth.set(depth + 1);
        Some(DepthGuard(&self.depth))
    }
}

/// Text between the first and last character when the branch opens with a quote.
fn quoted_inner(branch: &str) -> Option<&str> {
    let rest = branch.strip_prefix(&['"', '\''][..])?;
    let mut chars = rest.chars();
    chars.next_back();
    Some(chars.as_str())
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(v: serde_json::Value) -> Value {
        Value::from(v)
    }

    #[test]
    fn whole_string_placeholder_keeps_its_kind() {
        let t = Templater::new();
        let ctx = data(json!({"age": 30, "tags": ["a", "b"]}));
        assert_eq!(t.parse_value("{age}", &ctx, None), Value::Number(30.0));
        assert_eq!(t.parse_value("age {age}", &ctx, None), Value::from("age 30"));
        assert_eq!(t.parse("{tags}", &ctx, None), r#"["a","b"]"#);
    }

    #[test]
    fn only_the_first_occurrence_is_replaced_per_span() {
        let t = Templater::new();
        let ctx = data(json!({"n": 1}));
        assert_eq!(t.parse("{n}-{n}", &ctx, None), "1-1");
    }

    #[test]
    fn unregistered_function_keeps_resolved_body() {
        let t = Templater::new();
        let ctx = data(json!({"x": "val"}));
        assert_eq!(t.parse("{@Nope|{x}}", &ctx, None), "{@Nope|val}");
        assert_eq!(t.parse("{!@Nope|{x}}", &ctx, None), "{!@Nope|{x}}");
        assert_eq!(t.evaluate("@Nope|x", &ctx, None), None);
    }

    #[test]
    fn failing_function_leaves_placeholder() {
        let mut t = Templater::new();
        t.register_fn("Boom", |_| Err(EvalError::Runtime("boom".into())));
        let ctx = data(json!({"a": "A"}));
        assert_eq!(t.parse("{a} {@Boom|1} {a}", &ctx, None), "A {@Boom|1} A");
        assert_eq!(t.evaluate("@Boom|1", &ctx, None), Some(Value::Null));
    }

    #[test]
    fn exist_form() {
        let t = Templater::new();
        let ctx = data(json!({"user": {"name": "Ann"}, "fallback": "guest"}));
        assert_eq!(t.parse("{exist|user,'Hi {user.name}',fallback}", &ctx, None), "Hi Ann");
        assert_eq!(t.parse("{exist|nobody,'Hi',fallback}", &ctx, None), "guest");
        assert_eq!(t.parse("{EXIST|user,user.name,fallback}", &ctx, None), "Ann");
        assert_eq!(t.parse("{exist|user,only}", &ctx, None), "");
        assert_eq!(t.parse("{other|user}", &ctx, None), "");
    }

    #[test]
    fn nested_placeholder_becomes_a_dynamic_key() {
        let t = Templater::new();
        let ctx = data(json!({"field": "name", "name": "Ann"}));
        assert_eq!(t.parse("{{field}}", &ctx, None), "Ann");
    }

    #[test]
    fn depth_limit_leaves_inner_template_verbatim() {
        let mut opts = Options::default();
        opts.max_depth = Some(0);
        let mut limited = Templater::with_options(opts);
        limited.register_fn("Echo", |c| Ok(Value::from(c.arg(0).unwrap_or_default())));
        let ctx = data(json!({"name": "Ann"}));
        assert_eq!(limited.parse("{@Echo|{name}}", &ctx, None), "{name}");

        let mut unlimited = Templater::new();
        unlimited.register_fn("Echo", |c| Ok(Value::from(c.arg(0).unwrap_or_default())));
        assert_eq!(unlimited.parse("{@Echo|{name}}", &ctx, None), "Ann");
        assert_eq!(unlimited.depth.get(), 0);
    }

    #[test]
    fn custom_delimiters() {
        let t = Templater::new();
        let ctx = data(json!({"a": {"b": 7}}));
        assert_eq!(t.parse_with("<<a.b>> {a.b}", &ctx, None, "<<", ">>").unwrap(), "7 {a.b}");
        assert!(t.parse_with("x", &ctx, None, "%", "%").is_err());
    }

    #[test]
    fn cache_control() {
        let t = Templater::new();
        let ctx = data(json!({"a": 1}));
        t.parse("{a} {b}", &ctx, None);
        assert_eq!(t.cache_size(), 2);
        assert_eq!(t.cache_keys(), vec!["object_a:1:a", "object_a:1:b"]);
        t.clear_cache();
        assert!(t.is_cache_enabled());
        assert_eq!(t.cache_size(), 0);
        t.disable_cache();
        t.parse("{a}", &ctx, None);
        assert_eq!(t.cache_size(), 0);
        t.enable_cache();
        t.parse("{a}", &ctx, None);
        assert_eq!(t.cache_size(), 1);
    }
}
