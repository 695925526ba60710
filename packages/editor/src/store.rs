//! # Configuration Store
//!
//! Single-writer, synchronous store over [`StoreState`].
//!
//! ```text
//! dispatch(action)
//!   → validator   (reject: log, no state change, no notification)
//!   → reducer     (new Arc<StoreState>, or the same Arc for no-ops)
//!   → listeners   (in subscription order, before dispatch returns)
//! ```
//!
//! Every state read hands out an independent copy. Copies share structure
//! with the store's snapshot, so reads don't re-serialize the tree.

use crate::actions::{Action, Breakpoint};
use crate::config::EditorConfig;
use crate::reducer::reduce;
use crate::state::StoreState;
use crate::validator::{validate_action, validate_raw_action};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Store listener: `(new_state, previous_state, action)`
pub type Listener = Box<dyn FnMut(&StoreState, &StoreState, &Action)>;

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Whether a dispatch got past the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    Rejected,
}

impl DispatchOutcome {
    pub fn is_applied(self) -> bool {
        self == DispatchOutcome::Applied
    }
}

pub struct Store {
    state: Arc<StoreState>,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Store {
    /// Create a store whose base breakpoint is `desktop`
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            state: Arc::new(StoreState::new(config.base_breakpoint.clone())),
            config: config.clone(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Validate, reduce, and notify listeners
    pub fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        if !validate_action(&action) {
            return DispatchOutcome::Rejected;
        }

        if let Action::SetMode { mode } = &action {
            if !self.config.knows_breakpoint(mode) {
                debug!(breakpoint = %mode, "Switching to a breakpoint outside the configured set");
            }
        }

        let previous = Arc::clone(&self.state);
        self.state = reduce(&previous, &action, &self.config.base_breakpoint);
        debug!(action = action.kind(), dirty = self.state.is_dirty, "Dispatched action");

        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state, &previous, &action);
        }

        DispatchOutcome::Applied
    }

    /// Dispatch an action in its JSON wire form
    pub fn dispatch_raw(&mut self, raw: &Value) -> DispatchOutcome {
        match validate_raw_action(raw) {
            Some(action) => self.dispatch(action),
            None => DispatchOutcome::Rejected,
        }
    }

    /// Independent copy of the current state
    pub fn get_state(&self) -> StoreState {
        (*self.state).clone()
    }

    /// Shared handle to the current snapshot (read-only)
    pub fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.state)
    }

    pub fn base_breakpoint(&self) -> &Breakpoint {
        &self.config.base_breakpoint
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Register a listener, called synchronously after each applied dispatch
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreState, &StoreState, &Action) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Clear the dirty flag after the persistence layer confirms a save.
    ///
    /// Listeners are not notified.
    pub fn mark_saved(&mut self) {
        if self.state.is_dirty {
            let mut next = (*self.state).clone();
            next.is_dirty = false;
            self.state = Arc::new(next);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("base_breakpoint", &self.config.base_breakpoint)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
