//! # Identity Registry
//!
//! Gives every editable region a stable id and remembers it.
//!
//! Ids are derived from the element's position in the document:
//!
//! ```text
//! html:0>body:0>section:1>div:0      (tag:index-among-same-tag-siblings)
//!        ↓ 32-bit rolling hash (h = h*31 + unit, wrapping)
//!        ↓ |h| in base 36
//! gbn-1k2f9x
//! ```
//!
//! Identical structure yields identical ids across page loads, which is
//! what persisted configuration is keyed by. When a computed id is already
//! taken (hash collision, or a new element at the position of an old one),
//! random base-36 suffixes are appended until it is unique.
//!
//! Blocks are stored in an arena indexed by id. Element handles are kept
//! only as a reverse lookup and never own anything.

use crate::state::{merge_shallow, BlockState, ConfigMap, DEFAULT_ROLE};
use gbn_common::{ElementId, HostDocument};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Prefix of every generated block id
pub const ID_PREFIX: &str = "gbn-";

/// Attribute mirroring a block's config onto its element
pub const CONFIG_ATTRIBUTE: &str = "data-gbn-config";

/// One editable region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub id: String,
    pub role: String,
    /// Non-owning back-reference to the region's element
    pub element: ElementId,
    pub meta: ConfigMap,
    pub config: ConfigMap,
    pub styles: BlockStyles,
}

/// Style snapshot taken when the block was registered
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BlockStyles {
    pub inline: BTreeMap<String, String>,
}

impl Block {
    /// Display label from `meta.label`
    pub fn label(&self) -> Option<&str> {
        self.meta.get("label").and_then(Value::as_str)
    }

    /// Store-side view of this block
    pub fn to_state(&self) -> BlockState {
        BlockState {
            id: self.id.clone(),
            role: self.role.clone(),
            config: self.config.clone(),
            meta: self.meta.clone(),
        }
    }
}

pub struct IdentityRegistry {
    blocks: Vec<Block>,
    by_id: HashMap<String, usize>,
    by_element: HashMap<ElementId, usize>,
    issued: HashSet<String>,
    rng: SmallRng,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_os_rng())
    }

    /// Registry with reproducible collision suffixes
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            blocks: Vec::new(),
            by_id: HashMap::new(),
            by_element: HashMap::new(),
            issued: HashSet::new(),
            rng,
        }
    }

    /// Register an element, or return its existing block with `meta` merged.
    ///
    /// Returns `None` when the host doesn't know the element.
    pub fn register<H>(&mut self, host: &H, role: &str, element: ElementId, meta: ConfigMap) -> Option<&Block>
    where
        H: HostDocument + ?Sized,
    {
        if let Some(&index) = self.by_element.get(&element) {
            let block = &mut self.blocks[index];
            merge_shallow(&mut block.meta, &meta);
            debug!(block_id = %block.id, "Element already registered");
            return Some(&self.blocks[index]);
        }

        let Some(path) = dom_path(host, element) else {
            warn!(element = %element, "Cannot register unknown element");
            return None;
        };

        let id = self.issue_id(&path);
        let role = if role.is_empty() { DEFAULT_ROLE } else { role };
        debug!(block_id = %id, role, path = %path, "Registered block");

        let index = self.blocks.len();
        self.blocks.push(Block {
            id: id.clone(),
            role: role.to_string(),
            element,
            meta,
            config: ConfigMap::new(),
            styles: BlockStyles {
                inline: host.inline_styles(element),
            },
        });
        self.by_id.insert(id, index);
        self.by_element.insert(element, index);

        Some(&self.blocks[index])
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.by_id.get(id).map(|&index| &self.blocks[index])
    }

    pub fn get_by_element(&self, element: ElementId) -> Option<&Block> {
        self.by_element.get(&element).map(|&index| &self.blocks[index])
    }

    /// Every registered block, in registration order
    pub fn all(&self) -> Vec<&Block> {
        self.blocks.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drop every block and forget issued ids
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.by_id.clear();
        self.by_element.clear();
        self.issued.clear();
    }

    /// Shallow-merge `partial` into a block's config and mirror the result
    /// onto its element. Returns `None` for unknown ids.
    pub fn update_config<H>(&mut self, host: &mut H, id: &str, partial: &ConfigMap) -> Option<&Block>
    where
        H: HostDocument + ?Sized,
    {
        let Some(&index) = self.by_id.get(id) else {
            warn!(block_id = %id, "update_config for unknown block");
            return None;
        };

        let block = &mut self.blocks[index];
        merge_shallow(&mut block.config, partial);

        match serde_json::to_string(&block.config) {
            Ok(serialized) => {
                if let Err(e) = host.set_attribute(block.element, CONFIG_ATTRIBUTE, &serialized) {
                    warn!(block_id = %id, error = %e, "Could not mirror config onto element");
                }
            }
            Err(e) => warn!(block_id = %id, error = %e, "Could not serialize config"),
        }

        Some(&self.blocks[index])
    }

    fn issue_id(&mut self, path: &str) -> String {
        let mut id = compute_id(path);
        while self.issued.contains(&id) {
            let digit = self.rng.random_range(0..36u32);
            id.push('-');
            id.push(char::from_digit(digit, 36).unwrap_or('0'));
            debug!(id = %id, "Block id collision, extending");
        }
        self.issued.insert(id.clone());
        id
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("blocks", &self.blocks)
            .field("issued", &self.issued.len())
            .finish()
    }
}

/// Position of an element as `tag:index` segments, root to leaf.
///
/// `index` counts preceding siblings with the same tag. The document root
/// is not part of the path. Returns `None` for handles the host doesn't know.
pub fn dom_path<H>(host: &H, element: ElementId) -> Option<String>
where
    H: HostDocument + ?Sized,
{
    let mut segments = Vec::new();
    let mut current = Some(element);

    while let Some(node) = current {
        if host.is_document_root(node) {
            break;
        }
        let tag = host.tag_name(node)?.to_ascii_lowercase();
        let parent = host.parent(node);

        let index = parent.map_or(0, |parent| {
            host.children(parent)
                .into_iter()
                .take_while(|sibling| *sibling != node)
                .filter(|sibling| {
                    host.tag_name(*sibling)
                        .map_or(false, |t| t.eq_ignore_ascii_case(&tag))
                })
                .count()
        });

        segments.push(format!("{}:{}", tag, index));
        current = parent;
    }

    segments.reverse();
    Some(segments.join(">"))
}

/// 32-bit rolling hash over UTF-16 code units (`h = h * 31 + unit`, wrapping)
pub fn hash_path(path: &str) -> i32 {
    path.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Block id for a DOM path, before collision handling
pub fn compute_id(path: &str) -> String {
    let magnitude = i64::from(hash_path(path)).unsigned_abs();
    format!("{}{}", ID_PREFIX, to_base36(magnitude))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        // value % 36 < 36, always a valid digit
        digits.push(char::from_digit((value % 36) as u32, 36).unwrap_or('0'));
        value /= 36;
    }
    digits.iter().rev().collect()
}
