//! # Store State
//!
//! Snapshot types held by the configuration store.
//!
//! Blocks live in a persistent ordered map, so cloning a [`StoreState`] is
//! cheap and the clone never observes later writes to the original (and
//! vice versa). That is what lets `Store::get_state` hand out independent
//! copies on every call.
//!
//! ## Responsive storage
//!
//! ```text
//! config
//! ├─ color: "red"            ← base (desktop) value
//! └─ _responsive
//!     ├─ tablet { color: "blue" }
//!     └─ mobile { padding: 4 }
//! ```

use crate::actions::Breakpoint;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form JSON map used for configuration and annotations
pub type ConfigMap = serde_json::Map<String, Value>;

/// Reserved config key holding per-breakpoint overrides
pub const RESPONSIVE_KEY: &str = "_responsive";

/// Role assigned to blocks registered without one
pub const DEFAULT_ROLE: &str = "block";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// One block's configuration as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(default)]
    pub id: String,

    #[serde(default = "default_role")]
    pub role: String,

    #[serde(default)]
    pub config: ConfigMap,

    #[serde(default, skip_serializing_if = "ConfigMap::is_empty")]
    pub meta: ConfigMap,
}

impl BlockState {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            config: ConfigMap::new(),
            meta: ConfigMap::new(),
        }
    }

    pub fn with_config(mut self, config: ConfigMap) -> Self {
        self.config = config;
        self
    }

    /// Override map stored for a breakpoint, if any
    pub fn responsive(&self, breakpoint: &Breakpoint) -> Option<&ConfigMap> {
        self.config
            .get(RESPONSIVE_KEY)
            .and_then(Value::as_object)
            .and_then(|overrides| overrides.get(breakpoint.as_str()))
            .and_then(Value::as_object)
    }

    /// Override map for a breakpoint, created on first write.
    ///
    /// A `_responsive` entry (or breakpoint entry) that is not a map is
    /// replaced by an empty one.
    pub(crate) fn responsive_mut(&mut self, breakpoint: &Breakpoint) -> &mut ConfigMap {
        let overrides = ensure_object(
            self.config
                .entry(RESPONSIVE_KEY)
                .or_insert_with(|| Value::Object(ConfigMap::new())),
        );
        ensure_object(
            overrides
                .entry(breakpoint.as_str())
                .or_insert_with(|| Value::Object(ConfigMap::new())),
        )
    }

    /// Configuration a renderer paints for `breakpoint`.
    ///
    /// Base values overlaid by the breakpoint's override map. Overrides win
    /// per top-level key; nested maps are replaced, not merged. The reserved
    /// `_responsive` key is omitted.
    pub fn effective_config(&self, breakpoint: &Breakpoint, base: &Breakpoint) -> ConfigMap {
        let mut effective: ConfigMap = self
            .config
            .iter()
            .filter(|(key, _)| key.as_str() != RESPONSIVE_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if breakpoint != base {
            if let Some(overrides) = self.responsive(breakpoint) {
                merge_shallow(&mut effective, overrides);
            }
        }

        effective
    }
}

/// Single process-wide editing state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub blocks: OrdMap<String, BlockState>,

    /// At most one selected block
    pub selection: Option<String>,

    /// Breakpoint new edits target
    pub viewport_breakpoint: Breakpoint,

    /// Set by mutating actions, cleared after a confirmed save
    pub is_dirty: bool,
}

impl StoreState {
    pub fn new(viewport_breakpoint: Breakpoint) -> Self {
        Self {
            blocks: OrdMap::new(),
            selection: None,
            viewport_breakpoint,
            is_dirty: false,
        }
    }

    pub fn block(&self, id: &str) -> Option<&BlockState> {
        self.blocks.get(id)
    }

    /// Effective configuration of one block, see [`BlockState::effective_config`]
    pub fn effective_config(&self, id: &str, breakpoint: &Breakpoint, base: &Breakpoint) -> Option<ConfigMap> {
        self.blocks
            .get(id)
            .map(|block| block.effective_config(breakpoint, base))
    }

    /// `{ id: config }` map handed to the persistence layer
    pub fn to_persisted(&self) -> Value {
        let configs: ConfigMap = self
            .blocks
            .iter()
            .map(|(id, block)| (id.clone(), Value::Object(block.config.clone())))
            .collect();
        Value::Object(configs)
    }
}

/// Top-level merge: keys in `patch` replace keys in `target`
pub fn merge_shallow(target: &mut ConfigMap, patch: &ConfigMap) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

fn ensure_object(value: &mut Value) -> &mut ConfigMap {
    if !value.is_object() {
        *value = Value::Object(ConfigMap::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}
