//! # Action Validator
//!
//! Structural gate in front of the store. Nothing reaches the reducer
//! without passing [`validate_action`].
//!
//! Validation is side-effect free apart from logging: rejected input is
//! reported through `tracing` and the caller gets `false`/`None` back.
//! Blocks are repaired rather than rejected where a sensible default
//! exists (missing `role` or `config`).

use crate::actions::Action;
use crate::state::{BlockState, DEFAULT_ROLE};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Action is not an object")]
    NotAnObject,

    #[error("Action is missing a type")]
    MissingType,

    #[error("{0} is missing a target block id")]
    MissingBlockId(&'static str),

    #[error("{0} payload must be a map")]
    PayloadNotAMap(&'static str),

    #[error("Malformed {kind} action: {reason}")]
    Malformed { kind: String, reason: String },

    #[error("Block is not a map")]
    BlockNotAMap,

    #[error("Block is missing a non-empty string id")]
    BlockMissingId,
}

/// Check a typed action, returning the reason it is rejected
pub fn check_action(action: &Action) -> Result<(), ValidationError> {
    match action {
        Action::UpdateBlock { id, payload, .. } => {
            if id.as_deref().map_or(true, str::is_empty) {
                return Err(ValidationError::MissingBlockId("UPDATE_BLOCK"));
            }
            if !payload.is_object() {
                return Err(ValidationError::PayloadNotAMap("UPDATE_BLOCK"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Gate for typed actions
pub fn validate_action(action: &Action) -> bool {
    match check_action(action) {
        Ok(()) => true,
        Err(e) => {
            warn!(action = action.kind(), reason = %e, "Rejected action");
            false
        }
    }
}

/// Check an action in its JSON wire form and convert it.
///
/// Blocks carried by `INIT_BLOCKS` and `ADD_BLOCK` go through
/// [`validate_block`] first; `INIT_BLOCKS` entries without an id take their
/// map key, and entries that still fail are dropped.
pub fn parse_action(raw: &Value) -> Result<Action, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    let kind = match object.get("type").and_then(Value::as_str) {
        Some(kind) if !kind.is_empty() => kind,
        _ => return Err(ValidationError::MissingType),
    };

    let mut raw = raw.clone();
    match kind {
        "UPDATE_BLOCK" => {
            let has_id = object
                .get("id")
                .and_then(Value::as_str)
                .map_or(false, |id| !id.is_empty());
            if !has_id {
                return Err(ValidationError::MissingBlockId("UPDATE_BLOCK"));
            }
            if !object.get("payload").map_or(false, Value::is_object) {
                return Err(ValidationError::PayloadNotAMap("UPDATE_BLOCK"));
            }
        }
        "INIT_BLOCKS" => {
            if let Some(Value::Object(blocks)) = raw.get_mut("payload") {
                repair_block_map(blocks);
            }
        }
        "ADD_BLOCK" => {
            if let Some(block) = raw.get_mut("payload") {
                // An id-less block is left for the reducer to skip
                validate_block(block);
            }
        }
        _ => {}
    }

    let action: Action = serde_json::from_value(raw).map_err(|e| ValidationError::Malformed {
        kind: kind.to_string(),
        reason: e.to_string(),
    })?;

    check_action(&action)?;
    Ok(action)
}

/// Gate for actions in JSON wire form
pub fn validate_raw_action(raw: &Value) -> Option<Action> {
    match parse_action(raw) {
        Ok(action) => Some(action),
        Err(e) => {
            warn!(reason = %e, "Rejected action");
            None
        }
    }
}

fn repair_block_map(blocks: &mut Map<String, Value>) {
    blocks.retain(|key, block| {
        if let Value::Object(fields) = block {
            let missing_id = fields
                .get("id")
                .and_then(Value::as_str)
                .map_or(true, str::is_empty);
            if missing_id {
                debug!(block_id = %key, "Block id taken from its map key");
                fields.insert("id".to_string(), Value::String(key.clone()));
            }
        }
        if !validate_block(block) {
            return false;
        }

        // One unreadable entry must not take the rest of the load down with it
        match BlockState::deserialize(&*block) {
            Ok(_) => true,
            Err(e) => {
                warn!(block_id = %key, error = %e, "Dropped unreadable block");
                false
            }
        }
    });
}

/// Check a block, repairing missing `role`/`config` and non-map `meta` in place.
///
/// Returns `false` only for input that can't be repaired: a non-map or a
/// map without a non-empty string `id`.
pub fn validate_block(block: &mut Value) -> bool {
    let Some(fields) = block.as_object_mut() else {
        warn!(reason = %ValidationError::BlockNotAMap, "Rejected block");
        return false;
    };

    let id = match fields.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            warn!(reason = %ValidationError::BlockMissingId, "Rejected block");
            return false;
        }
    };

    if !fields.get("role").map_or(false, Value::is_string) {
        warn!(block_id = %id, role = DEFAULT_ROLE, "Block has no role, using default");
        fields.insert("role".to_string(), Value::String(DEFAULT_ROLE.to_string()));
    }

    if !fields.get("config").map_or(false, Value::is_object) {
        warn!(block_id = %id, "Block has no config, using an empty one");
        fields.insert("config".to_string(), Value::Object(Map::new()));
    }

    if fields.get("meta").map_or(false, |meta| !meta.is_object()) {
        warn!(block_id = %id, "Block meta is not a map, using an empty one");
        fields.insert("meta".to_string(), Value::Object(Map::new()));
    }

    true
}

/// Map absent values to `None`.
///
/// `null` and missing values come back as `None`; everything else passes
/// through. JSON numbers can't hold NaN, so a NaN never reaches this point.
pub fn sanitize_value(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        other => other,
    }
}
