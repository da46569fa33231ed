use crate::delimiter::Delimiters;
use crate::dispatch::Convention;
use crate::engine::Templater;
use crate::errors::Result;
use crate::value::Value;
use itertools::Itertools;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub mod array;
pub mod math;
pub mod string;

/// Trait for pluggable functions reachable from placeholders.
pub trait Function: Send + Sync {
    /// Accepted argument counts. Calls outside the range resolve to null
    /// without reaching [`Function::call`].
    fn arity(&self) -> RangeInclusive<usize> {
        0..=usize::MAX
    }

    /// Errors are caught by the engine and never abort template processing.
    fn call(&self, call: &Call<'_>) -> Result<Value>;
}

/// Adapter so plain closures can be registered.
struct FnFunction<F>(F);

impl<F> Function for FnFunction<F>
where
    F: Fn(&Call<'_>) -> Result<Value> + Send + Sync,
{
    fn call(&self, call: &Call<'_>) -> Result<Value> {
        (self.0)(call)
    }
}

/// Everything a function receives for one invocation.
///
/// Which contexts are visible depends on the calling convention: none under
/// `@`, the primary under `!@` and `#@`, both under `##@`.
pub struct Call<'a> {
    pub(crate) engine: &'a Templater,
    pub(crate) delimiters: &'a Delimiters,
    pub(crate) convention: Convention,
    pub(crate) primary: &'a Value,
    pub(crate) secondary: &'a Value,
    pub(crate) args: Vec<String>,
}

impl<'a> Call<'a> {
    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// Arguments as split from the placeholder body. Under `#@`/`##@` they may
    /// still hold unresolved sub-template text.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn primary(&self) -> Option<&'a Value> {
        match self.convention {
            Convention::Plain => None,
            _ => Some(self.primary),
        }
    }

    pub fn secondary(&self) -> Option<&'a Value> {
        match self.convention {
            Convention::Dual => Some(self.secondary),
            _ => None,
        }
    }

    /// The context the convention hands over first: the secondary one under
    /// `##@`, the primary one under `!@`/`#@`.
    pub fn context(&self) -> Option<&'a Value> {
        self.secondary().or_else(|| self.primary())
    }

    /// Render `template` against `data` with the calling engine and the
    /// delimiters of the template being processed.
    pub fn parse(&self, template: &str, data: &Value) -> String {
        self.engine.render(template, data, None, self.delimiters).to_string()
    }

    /// Cached path lookup through the calling engine.
    pub fn resolve(&self, data: &Value, path: &str) -> Value {
        self.engine.resolve(data, path)
    }
}

/// Function table of one engine instance. Names are case-sensitive.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        string::register(&mut registry);
        math::register(&mut registry);
        array::register(&mut registry);
        registry
    }

    /// Add `function` under `name`, replacing any earlier entry.
    pub fn register<F: Function + 'static>(&mut self, name: impl Into<String>, function: F) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(name.into(), Arc::new(function));
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(name, FnFunction(function));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.inner.keys().map(String::as_str).sorted().collect()
    }
}
