//! # Reducer
//!
//! Pure `(state, action) -> state` function behind the store.
//!
//! States are shared behind [`Arc`]. Branches that change nothing return the
//! input `Arc` itself, so callers can detect a no-op with `Arc::ptr_eq`.
//!
//! ## Breakpoint scoping
//!
//! `UPDATE_BLOCK` at the base breakpoint merges into `config`; at any other
//! breakpoint it merges into `config._responsive[breakpoint]` and leaves the
//! base values alone. Both merges are shallow.

use crate::actions::{Action, Breakpoint};
use crate::state::{merge_shallow, BlockState, ConfigMap, StoreState};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Apply one action. `base` is the breakpoint that owns `block.config`.
pub fn reduce(state: &Arc<StoreState>, action: &Action, base: &Breakpoint) -> Arc<StoreState> {
    match action {
        Action::InitBlocks { payload } => init_blocks(state, payload),

        Action::UpdateBlock {
            id: Some(id),
            payload: Value::Object(payload),
            breakpoint,
        } => {
            let breakpoint = breakpoint
                .as_ref()
                .unwrap_or(&state.viewport_breakpoint);
            update_block(state, id, payload, breakpoint, base)
        }

        Action::AddBlock { payload } => add_block(state, payload),

        Action::DeleteBlock { id } => delete_block(state, id),

        Action::SelectBlock { id } => {
            let mut next = (**state).clone();
            next.selection = id.clone();
            Arc::new(next)
        }

        Action::SetMode { mode } => {
            let mut next = (**state).clone();
            next.viewport_breakpoint = mode.clone();
            Arc::new(next)
        }

        // Malformed UPDATE_BLOCK never gets past the validator
        Action::UpdateBlock { .. } | Action::Unknown => Arc::clone(state),
    }
}

fn init_blocks(state: &Arc<StoreState>, payload: &BTreeMap<String, BlockState>) -> Arc<StoreState> {
    let mut next = (**state).clone();
    next.blocks = payload
        .iter()
        .map(|(key, block)| (key.clone(), block.clone()))
        .collect();
    debug!(blocks = next.blocks.len(), "Initialized blocks");
    Arc::new(next)
}

fn update_block(
    state: &Arc<StoreState>,
    id: &str,
    payload: &ConfigMap,
    breakpoint: &Breakpoint,
    base: &Breakpoint,
) -> Arc<StoreState> {
    if !state.blocks.contains_key(id) {
        warn!(block_id = %id, "UPDATE_BLOCK for unknown block ignored");
        return Arc::clone(state);
    }

    let mut next = (**state).clone();
    if let Some(block) = next.blocks.get_mut(id) {
        if breakpoint == base {
            merge_shallow(&mut block.config, payload);
        } else {
            merge_shallow(block.responsive_mut(breakpoint), payload);
        }
    }
    next.is_dirty = true;

    debug!(block_id = %id, breakpoint = %breakpoint, keys = payload.len(), "Updated block");
    Arc::new(next)
}

fn add_block(state: &Arc<StoreState>, block: &BlockState) -> Arc<StoreState> {
    if block.id.is_empty() {
        warn!("ADD_BLOCK without an id ignored");
        return Arc::clone(state);
    }

    let mut next = (**state).clone();
    next.blocks.insert(block.id.clone(), block.clone());
    next.is_dirty = true;
    Arc::new(next)
}

fn delete_block(state: &Arc<StoreState>, id: &str) -> Arc<StoreState> {
    if !state.blocks.contains_key(id) {
        warn!(block_id = %id, "DELETE_BLOCK for unknown block ignored");
        return Arc::clone(state);
    }

    let mut next = (**state).clone();
    next.blocks.remove(id);
    if next.selection.as_deref() == Some(id) {
        next.selection = None;
    }
    next.is_dirty = true;
    Arc::new(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state_with_b1() -> Arc<StoreState> {
        let mut state = StoreState::new(Breakpoint::Desktop);
        let config = json!({ "color": "red" }).as_object().cloned().unwrap();
        state
            .blocks
            .insert("b1".to_string(), BlockState::new("b1", "menu").with_config(config));
        Arc::new(state)
    }

    fn payload(value: serde_json::Value) -> ConfigMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_update_at_base_merges_into_config() {
        let state = state_with_b1();
        let action = Action::update_block("b1", payload(json!({ "color": "blue", "size": 2 })));

        let next = reduce(&state, &action, &Breakpoint::Desktop);

        let config = &next.blocks["b1"].config;
        assert_eq!(config.get("color"), Some(&json!("blue")));
        assert_eq!(config.get("size"), Some(&json!(2)));
        assert!(next.is_dirty);
    }

    #[test]
    fn test_update_at_other_breakpoint_writes_override() {
        let state = state_with_b1();
        let action = Action::update_block_at("b1", payload(json!({ "color": "blue" })), Breakpoint::Tablet);

        let next = reduce(&state, &action, &Breakpoint::Desktop);

        let block = &next.blocks["b1"];
        assert_eq!(block.config.get("color"), Some(&json!("red")));
        assert_eq!(
            block.responsive(&Breakpoint::Tablet).and_then(|o| o.get("color")),
            Some(&json!("blue"))
        );
    }

    #[test]
    fn test_update_defaults_to_viewport_breakpoint() {
        let state = reduce(&state_with_b1(), &Action::SetMode { mode: Breakpoint::Mobile }, &Breakpoint::Desktop);
        let next = reduce(&state, &Action::update_block("b1", payload(json!({ "gap": 4 }))), &Breakpoint::Desktop);

        let block = &next.blocks["b1"];
        assert!(!block.config.contains_key("gap"));
        assert_eq!(
            block.responsive(&Breakpoint::Mobile).and_then(|o| o.get("gap")),
            Some(&json!(4))
        );
    }

    #[test]
    fn test_update_is_shallow() {
        let state = reduce(
            &state_with_b1(),
            &Action::update_block("b1", payload(json!({ "border": { "width": 1, "style": "solid" } }))),
            &Breakpoint::Desktop,
        );
        let next = reduce(
            &state,
            &Action::update_block("b1", payload(json!({ "border": { "width": 2 } }))),
            &Breakpoint::Desktop,
        );

        assert_eq!(next.blocks["b1"].config.get("border"), Some(&json!({ "width": 2 })));
    }

    #[test]
    fn test_update_unknown_block_is_identity() {
        let state = state_with_b1();
        let next = reduce(&state, &Action::update_block("nope", payload(json!({ "a": 1 }))), &Breakpoint::Desktop);
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_delete_unknown_block_is_identity() {
        let state = state_with_b1();
        let next = reduce(&state, &Action::DeleteBlock { id: "nope".to_string() }, &Breakpoint::Desktop);

        assert!(Arc::ptr_eq(&state, &next));
        assert!(!next.is_dirty);
        assert!(next.blocks.contains_key("b1"));
    }

    #[test]
    fn test_delete_clears_matching_selection() {
        let state = reduce(&state_with_b1(), &Action::select(Some("b1".to_string())), &Breakpoint::Desktop);
        let next = reduce(&state, &Action::DeleteBlock { id: "b1".to_string() }, &Breakpoint::Desktop);

        assert!(next.blocks.is_empty());
        assert_eq!(next.selection, None);
        assert!(next.is_dirty);
    }

    #[test]
    fn test_delete_keeps_other_selection() {
        let mut state = (*state_with_b1()).clone();
        state.blocks.insert("b2".to_string(), BlockState::new("b2", "block"));
        state.selection = Some("b2".to_string());
        let state = Arc::new(state);

        let next = reduce(&state, &Action::DeleteBlock { id: "b1".to_string() }, &Breakpoint::Desktop);
        assert_eq!(next.selection.as_deref(), Some("b2"));
    }

    #[test]
    fn test_select_and_set_mode_do_not_dirty() {
        let state = state_with_b1();
        let selected = reduce(&state, &Action::select(Some("b1".to_string())), &Breakpoint::Desktop);
        let switched = reduce(&selected, &Action::SetMode { mode: Breakpoint::Tablet }, &Breakpoint::Desktop);

        assert_eq!(switched.selection.as_deref(), Some("b1"));
        assert_eq!(switched.viewport_breakpoint, Breakpoint::Tablet);
        assert!(!switched.is_dirty);
    }

    #[test]
    fn test_add_block() {
        let state = Arc::new(StoreState::new(Breakpoint::Desktop));

        let skipped = reduce(&state, &Action::AddBlock { payload: BlockState::new("", "block") }, &Breakpoint::Desktop);
        assert!(Arc::ptr_eq(&state, &skipped));

        let next = reduce(&state, &Action::AddBlock { payload: BlockState::new("b9", "principal") }, &Breakpoint::Desktop);
        assert_eq!(next.blocks["b9"].role, "principal");
        assert!(next.is_dirty);
    }

    #[test]
    fn test_init_blocks_replaces_wholesale() {
        let state = state_with_b1();
        let mut payload = BTreeMap::new();
        payload.insert("b2".to_string(), BlockState::new("b2", "block"));

        let next = reduce(&state, &Action::InitBlocks { payload }, &Breakpoint::Desktop);

        assert!(!next.blocks.contains_key("b1"));
        assert!(next.blocks.contains_key("b2"));
        assert!(!next.is_dirty);
    }

    #[test]
    fn test_unknown_action_returns_same_state() {
        let state = state_with_b1();
        let next = reduce(&state, &Action::Unknown, &Breakpoint::Desktop);
        assert!(Arc::ptr_eq(&state, &next));
    }
}
