//! # Store Actions
//!
//! The closed set of operations the configuration store understands.
//!
//! Actions travel as JSON from the editing panel, tagged by `type`:
//!
//! ```json
//! { "type": "UPDATE_BLOCK", "id": "gbn-1x2", "payload": { "color": "blue" }, "breakpoint": "tablet" }
//! ```
//!
//! Any `type` outside the set deserializes to [`Action::Unknown`], which the
//! reducer treats as an identity no-op.

use crate::state::{BlockState, ConfigMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Responsive viewport tier that scopes configuration writes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
    Custom(String),
}

impl Breakpoint {
    pub fn as_str(&self) -> &str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
            Breakpoint::Custom(name) => name,
        }
    }
}

impl From<String> for Breakpoint {
    fn from(name: String) -> Self {
        match name.as_str() {
            "desktop" => Breakpoint::Desktop,
            "tablet" => Breakpoint::Tablet,
            "mobile" => Breakpoint::Mobile,
            _ => Breakpoint::Custom(name),
        }
    }
}

impl From<&str> for Breakpoint {
    fn from(name: &str) -> Self {
        Breakpoint::from(name.to_string())
    }
}

impl From<Breakpoint> for String {
    fn from(breakpoint: Breakpoint) -> Self {
        match breakpoint {
            Breakpoint::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace every block configuration
    InitBlocks { payload: BTreeMap<String, BlockState> },

    /// Shallow-merge `payload` into a block, scoped by breakpoint
    UpdateBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        payload: Value,
        /// Defaults to the store's current viewport breakpoint
        #[serde(default, skip_serializing_if = "Option::is_none")]
        breakpoint: Option<Breakpoint>,
    },

    AddBlock { payload: BlockState },

    DeleteBlock { id: String },

    SelectBlock {
        #[serde(default)]
        id: Option<String>,
    },

    /// Switch the viewport breakpoint new edits target
    SetMode { mode: Breakpoint },

    #[serde(other)]
    Unknown,
}

impl Action {
    /// Update a block at the store's current breakpoint
    pub fn update_block(id: impl Into<String>, payload: ConfigMap) -> Self {
        Action::UpdateBlock {
            id: Some(id.into()),
            payload: Value::Object(payload),
            breakpoint: None,
        }
    }

    /// Update a block at an explicit breakpoint
    pub fn update_block_at(id: impl Into<String>, payload: ConfigMap, breakpoint: Breakpoint) -> Self {
        Action::UpdateBlock {
            id: Some(id.into()),
            payload: Value::Object(payload),
            breakpoint: Some(breakpoint),
        }
    }

    pub fn select(id: Option<String>) -> Self {
        Action::SelectBlock { id }
    }

    /// Wire name of the action type
    pub fn kind(&self) -> &'static str {
        match self {
            Action::InitBlocks { .. } => "INIT_BLOCKS",
            Action::UpdateBlock { .. } => "UPDATE_BLOCK",
            Action::AddBlock { .. } => "ADD_BLOCK",
            Action::DeleteBlock { .. } => "DELETE_BLOCK",
            Action::SelectBlock { .. } => "SELECT_BLOCK",
            Action::SetMode { .. } => "SET_MODE",
            Action::Unknown => "UNKNOWN",
        }
    }
}
