//! # Editing Context
//!
//! One object per page load holding the registry, store, and panel
//! manager. Consumers receive it explicitly instead of reaching for
//! globals.
//!
//! ```text
//! click on region
//!   → registry.register        (stable id)
//!   → modes.setup(block)       (cleanup previous context first)
//!   → modes.activate_block
//!   → store.dispatch(SELECT_BLOCK)
//! field edit
//!   → store.dispatch(UPDATE_BLOCK) → registry.update_config (mirror)
//! ```

use crate::actions::Action;
use crate::config::EditorConfig;
use crate::mode_machine::PanelMode;
use crate::mode_manager::ModeManager;
use crate::registry::IdentityRegistry;
use crate::state::{BlockState, ConfigMap, StoreState};
use crate::store::{DispatchOutcome, Store};
use gbn_common::{ElementId, HostDocument};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Context {
    config: EditorConfig,
    registry: IdentityRegistry,
    store: Store,
    modes: ModeManager,
}

impl Context {
    pub fn create(config: EditorConfig) -> Self {
        Self::with_registry(config, IdentityRegistry::new())
    }

    /// Context whose id collision suffixes are reproducible
    pub fn with_seed(config: EditorConfig, seed: u64) -> Self {
        Self::with_registry(config, IdentityRegistry::with_seed(seed))
    }

    fn with_registry(config: EditorConfig, registry: IdentityRegistry) -> Self {
        info!(base = %config.base_breakpoint, breakpoints = config.breakpoints.len(), "Editing context created");
        Self {
            store: Store::with_config(&config),
            modes: ModeManager::with_config(&config),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn modes(&self) -> &ModeManager {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut ModeManager {
        &mut self.modes
    }

    /// Register the page's editable regions and seed the store with them.
    ///
    /// Returns the ids in the order given; unknown elements are skipped.
    pub fn bootstrap<H>(&mut self, host: &H, regions: &[(ElementId, &str)]) -> Vec<String>
    where
        H: HostDocument + ?Sized,
    {
        let ids: Vec<String> = regions
            .iter()
            .filter_map(|(element, role)| {
                self.registry
                    .register(host, role, *element, ConfigMap::new())
                    .map(|block| block.id.clone())
            })
            .collect();

        self.sync_registry();
        ids
    }

    /// Handle a click on an editable region
    pub fn select_element<H>(&mut self, host: &mut H, element: ElementId, role: &str, meta: ConfigMap) -> Option<String>
    where
        H: HostDocument + ?Sized,
    {
        let (id, title) = {
            let block = self.registry.register(&*host, role, element, meta)?;
            let title = block.label().unwrap_or(block.role.as_str()).to_string();
            (block.id.clone(), title)
        };

        if self.store.snapshot().block(&id).is_none() {
            self.sync_registry();
        }

        let class = self.panel_class(PanelMode::Block);
        self.modes.setup(host, PanelMode::Block, &class, &title);
        self.modes.activate_block(id.clone(), element);
        self.store.dispatch(Action::select(Some(id.clone())));

        debug!(block_id = %id, "Block selected");
        Some(id)
    }

    /// Apply a field edit to the selected block at the current breakpoint
    pub fn edit_selected<H>(&mut self, host: &mut H, payload: ConfigMap) -> DispatchOutcome
    where
        H: HostDocument + ?Sized,
    {
        let Some(id) = self.store.snapshot().selection.clone() else {
            warn!("Edit with no block selected ignored");
            return DispatchOutcome::Rejected;
        };

        let outcome = self.store.dispatch(Action::update_block(id.clone(), payload));
        if outcome.is_applied() {
            if let Some(block) = self.store.snapshot().block(&id) {
                self.registry.update_config(host, &id, &block.config);
            }
        }
        outcome
    }

    pub fn open_theme_panel<H>(&mut self, host: &mut H, title: &str)
    where
        H: HostDocument + ?Sized,
    {
        self.open_panel(host, PanelMode::Theme, title);
    }

    pub fn open_page_panel<H>(&mut self, host: &mut H, title: &str)
    where
        H: HostDocument + ?Sized,
    {
        self.open_panel(host, PanelMode::Page, title);
    }

    pub fn open_restore_panel<H>(&mut self, host: &mut H, title: &str)
    where
        H: HostDocument + ?Sized,
    {
        self.open_panel(host, PanelMode::Restore, title);
    }

    /// Close the panel and drop the selection
    pub fn close_panel<H>(&mut self, host: &mut H)
    where
        H: HostDocument + ?Sized,
    {
        self.modes.close(host);
        if self.store.snapshot().selection.is_some() {
            self.store.dispatch(Action::select(None));
        }
    }

    /// Tear the context down, returning the final state
    pub fn dispose(mut self) -> StoreState {
        let state = self.store.get_state();
        self.registry.clear();
        info!(blocks = state.blocks.len(), dirty = state.is_dirty, "Editing context disposed");
        state
    }

    fn open_panel<H>(&mut self, host: &mut H, mode: PanelMode, title: &str)
    where
        H: HostDocument + ?Sized,
    {
        let class = self.panel_class(mode);
        self.modes.setup(host, mode, &class, title);
        if self.store.snapshot().selection.is_some() {
            self.store.dispatch(Action::select(None));
        }
    }

    fn panel_class(&self, mode: PanelMode) -> String {
        format!("{}{}", self.config.panel_class_prefix, mode)
    }

    /// Seed the store with registry blocks it hasn't seen; store entries win
    fn sync_registry(&mut self) {
        let snapshot = self.store.snapshot();
        let mut payload: BTreeMap<String, BlockState> = snapshot
            .blocks
            .iter()
            .map(|(id, block)| (id.clone(), block.clone()))
            .collect();

        for block in self.registry.all() {
            payload
                .entry(block.id.clone())
                .or_insert_with(|| block.to_state());
        }

        self.store.dispatch(Action::InitBlocks { payload });
    }
}
