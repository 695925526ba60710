//! # GBN Editor
//!
//! Configuration engine behind the in-page visual builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: editable region → stable block id │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mode manager: which context owns the panel  │
//! │  - cleanup before every transition          │
//! │  - pure machine + effect executor           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: validated, synchronous reducer       │
//! │  - breakpoint-scoped config writes          │
//! │  - independent snapshots for every read     │
//! │  - listeners notified per dispatch          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Ids are positional and stable**: same structure, same id
//! 2. **Nothing unvalidated reaches the reducer**
//! 3. **Reads never alias the store**: snapshots are independent
//! 4. **Transitions always clean up**: no UI from the previous mode survives
//! 5. **Never crash the host page**: bad input is logged and ignored
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gbn_editor::{Action, Breakpoint, Context, EditorConfig};
//! use gbn_common::Dom;
//!
//! let mut dom = Dom::new();
//! let mut ctx = Context::create(EditorConfig::default());
//!
//! // Click on a region
//! let id = ctx.select_element(&mut dom, element, "menu", meta).unwrap();
//!
//! // Edit it for tablets only
//! ctx.store_mut().dispatch(Action::update_block_at(id, payload, Breakpoint::Tablet));
//! ```

mod actions;
mod config;
mod context;
mod errors;
mod mode_machine;
mod mode_manager;
mod reducer;
mod registry;
mod state;
mod store;
mod validator;

pub use actions::{Action, Breakpoint};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use context::Context;
pub use errors::EditorError;
pub use mode_machine::{ActiveBlock, ModeMachine, PanelEffect, PanelMode};
pub use mode_manager::{ModeManager, PanelHandles, ResetHook, DOCKED_CLASS, OPEN_CLASS, PANEL_CLASS};
pub use reducer::reduce;
pub use registry::{
    compute_id, dom_path, hash_path, Block, BlockStyles, IdentityRegistry, CONFIG_ATTRIBUTE, ID_PREFIX,
};
pub use state::{merge_shallow, BlockState, ConfigMap, StoreState, DEFAULT_ROLE, RESPONSIVE_KEY};
pub use store::{DispatchOutcome, Listener, Store, SubscriptionId};
pub use validator::{
    check_action, parse_action, sanitize_value, validate_action, validate_block, validate_raw_action,
    ValidationError,
};

// Re-export host document types for convenience
pub use gbn_common::{Dom, ElementId, HostDocument};
