use crate::cache::CacheMode;
use crate::delimiter::Delimiters;
use crate::errors::{EvalError, Result};
use serde::Deserialize;

/// Engine configuration. Every field has a default, so `{}` is a valid
/// configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Whether the path cache starts enabled.
    pub cache: bool,
    pub cache_mode: CacheMode,
    /// Limit on nested re-entry into `parse`; `None` is unlimited.
    pub max_depth: Option<usize>,
    /// Written as `"open...close"` in configuration text.
    pub delimiters: Delimiters,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache: true,
            cache_mode: CacheMode::default(),
            max_depth: None,
            delimiters: Delimiters::default(),
        }
    }
}

impl Options {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EvalError::Parse(format!("invalid options: {e}")))
    }
}
