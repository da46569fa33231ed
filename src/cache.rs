//! Memoized path resolution.
//!
//! Entries are keyed by `fingerprint(context) + ":" + path`. The default
//! fingerprint is approximate: it looks at the first three keys of a mapping
//! (or the length and first element of a sequence), so two different contexts
//! that agree on those share entries. [`CacheMode::Strict`] keys by a 64-bit
//! `DefaultHasher` digest of the whole tree instead. Two distinct trees with
//! the same digest would still share entries; that is unlikely, not impossible.

use crate::path;
use crate::value::Value;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Number of mapping keys the approximate fingerprint looks at.
const FINGERPRINT_KEYS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Shape-based key; cheap but collides for look-alike contexts.
    #[default]
    Approximate,
    /// 64-bit digest of the full context tree. Collisions are improbable but
    /// not ruled out.
    Strict,
}

/// Store of resolved paths. `None` store means the cache is disabled.
#[derive(Debug, Default)]
pub struct Cache {
    store: Option<HashMap<String, Value>>,
    mode: CacheMode,
}

impl Cache {
    pub fn new(enabled: bool, mode: CacheMode) -> Self {
        Self { store: enabled.then(HashMap::new), mode }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Start caching again with an empty store. No-op when already enabled.
    pub fn enable(&mut self) {
        self.store.get_or_insert_with(HashMap::new);
    }

    /// Drop every entry and bypass the store until re-enabled.
    pub fn disable(&mut self) {
        self.store = None;
    }

    /// Drop every entry, keeping the enabled flag.
    pub fn clear(&mut self) {
        if let Some(store) = self.store.as_mut() {
            store.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.store.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.store
            .iter()
            .flat_map(HashMap::keys)
            .cloned()
            .sorted()
            .collect()
    }

    pub fn key_for(&self, context: &Value, path: &str) -> String {
        let id = match self.mode {
            CacheMode::Approximate => fingerprint(context),
            CacheMode::Strict => strict_fingerprint(context),
        };
        format!("{id}:{path}")
    }

    /// Resolve `path` in `context`, reading and filling the store when enabled.
    pub fn resolve(&mut self, context: &Value, path: &str) -> Value {
        if self.store.is_none() {
            return path::resolve(context, path).cloned().unwrap_or_default();
        }
        let key = self.key_for(context, path);
        let store = self.store.get_or_insert_with(HashMap::new);
        if let Some(hit) = store.get(&key) {
            tracing::debug!(%key, "cache hit");
            return hit.clone();
        }
        tracing::debug!(%key, "cache miss");
        let resolved = path::resolve(context, path).cloned().unwrap_or_default();
        store.insert(key, resolved.clone());
        resolved
    }
}

/// Approximate structural key of a context.
pub fn fingerprint(context: &Value) -> String {
    match context {
        Value::Null => "null".to_string(),
        Value::Sequence(items) => {
            let first = items
                .first()
                .and_then(|v| serde_json::to_string(v).ok())
                .unwrap_or_else(|| "null".to_string());
            format!("array_{}_{}", items.len(), first)
        }
        Value::Mapping(map) => {
            let pairs = map
                .iter()
                .take(FINGERPRINT_KEYS)
                .sorted_by(|a, b| a.0.cmp(b.0))
                .map(|(k, v)| format!("{k}:{}", member_tag(v)))
                .join("|");
            format!("object_{pairs}")
        }
        Value::Callable(c) => format!("primitive_function_{}", c.name()),
        scalar => format!("primitive_{}_{}", scalar.kind(), scalar),
    }
}

/// Mapping members that cannot be written inline get a fixed token.
fn member_tag(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Sequence(_) | Value::Mapping(_) => "object".to_string(),
        Value::Callable(_) => "function".to_string(),
        scalar => scalar.to_string(),
    }
}

fn strict_fingerprint(context: &Value) -> String {
    let mut hasher = DefaultHasher::new();
    hash_value(context, &mut hasher);
    format!("strict_{:016x}", hasher.finish())
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    value.kind().hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => n.to_bits().hash(state),
        Value::String(s) => s.hash(state),
        Value::Sequence(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Mapping(map) => {
            map.len().hash(state);
            for (k, v) in map {
                k.hash(state);
                hash_value(v, state);
            }
        }
        Value::Callable(c) => {
            c.name().hash(state);
            c.identity().hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fingerprint_shapes() {
        assert_eq!(fingerprint(&Value::Null), "null");
        assert_eq!(fingerprint(&Value::from(json!([{"a": 1}, 2]))), r#"array_2_{"a":1}"#);
        assert_eq!(fingerprint(&Value::from(json!([]))), "array_0_null");
        assert_eq!(fingerprint(&Value::from("x")), "primitive_string_x");
        assert_eq!(fingerprint(&Value::from(4.0)), "primitive_number_4");
        assert_eq!(
            fingerprint(&Value::from(json!({"z": 1, "a": {"n": 1}, "m": [1], "q": 9}))),
            "object_a:object|m:object|z:1"
        );
    }

    #[test]
    fn approximate_mode_collides_on_look_alike_contexts() {
        let a = Value::from(json!({"k1": 1, "k2": 2, "k3": 3, "extra": "A"}));
        let b = Value::from(json!({"k1": 1, "k2": 2, "k3": 3, "extra": "B"}));
        let mut cache = Cache::new(true, CacheMode::Approximate);
        assert_eq!(cache.resolve(&a, "extra"), Value::from("A"));
        assert_eq!(cache.resolve(&b, "extra"), Value::from("A"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn strict_mode_tells_look_alike_contexts_apart() {
        let a = Value::from(json!({"k1": 1, "k2": 2, "k3": 3, "extra": "A"}));
        let b = Value::from(json!({"k1": 1, "k2": 2, "k3": 3, "extra": "B"}));
        let mut cache = Cache::new(true, CacheMode::Strict);
        assert_eq!(cache.resolve(&a, "extra"), Value::from("A"));
        assert_eq!(cache.resolve(&b, "extra"), Value::from("B"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn disable_clears_and_bypasses() {
        let data = Value::from(json!({"test": "value"}));
        let mut cache = Cache::new(true, CacheMode::default());
        cache.resolve(&data, "test");
        assert_eq!(cache.keys(), vec!["object_test:value:test".to_string()]);

        cache.disable();
        assert!(!cache.is_enabled());
        assert_eq!(cache.resolve(&data, "test"), Value::from("value"));
        assert!(cache.is_empty());

        cache.enable();
        assert!(cache.is_enabled());
        assert!(cache.is_empty());
        cache.resolve(&data, "test");
        cache.clear();
        assert!(cache.is_enabled());
        assert!(cache.is_empty());
    }

    #[test]
    fn misses_are_cached_as_null() {
        let data = Value::from(json!({"office": {"rooms": null}}));
        let mut cache = Cache::new(true, CacheMode::default());
        assert_eq!(cache.resolve(&data, "office.rooms.number"), Value::Null);
        assert_eq!(cache.resolve(&data, "office.rooms.number"), Value::Null);
        assert_eq!(cache.len(), 1);
    }
}
