//! # Panel Mode Manager
//!
//! Applies [`ModeMachine`] transitions to the page.
//!
//! The manager owns the panel's UI handles (root, title, tab navigation,
//! body, footer status) and a reset hook per renderer. Any handle that
//! can't be resolved turns its effect into a logged no-op; the editing
//! panel must never take the host page down.

use crate::config::EditorConfig;
use crate::mode_machine::{ActiveBlock, ModeMachine, PanelEffect, PanelMode};
use gbn_common::{CommonResult, ElementId, HostDocument};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Class on the panel root
pub const PANEL_CLASS: &str = "gbn-panel";

/// Class on the panel root while it is open
pub const OPEN_CLASS: &str = "is-open";

/// Class on the page body while the panel is docked
pub const DOCKED_CLASS: &str = "gbn-docked";

/// Renderer reset hook, run when the panel leaves that renderer's mode
pub type ResetHook = Box<dyn FnMut()>;

/// Elements making up the editing panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelHandles {
    pub root: ElementId,
    pub title: ElementId,
    pub tabs: ElementId,
    pub body: ElementId,
    pub footer: ElementId,
    pub status: ElementId,
}

pub struct ModeManager {
    machine: ModeMachine,
    handles: Option<PanelHandles>,
    reset_hooks: HashMap<PanelMode, ResetHook>,
}

impl ModeManager {
    pub fn new(simulated_state_classes: Vec<String>) -> Self {
        Self {
            machine: ModeMachine::new(simulated_state_classes),
            handles: None,
            reset_hooks: HashMap::new(),
        }
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self::new(config.simulated_state_classes.clone())
    }

    pub fn mode(&self) -> PanelMode {
        self.machine.mode()
    }

    pub fn active_block(&self) -> Option<&ActiveBlock> {
        self.machine.active_block()
    }

    /// Panel elements, once the panel has been built
    pub fn handles(&self) -> Option<PanelHandles> {
        self.handles
    }

    /// Register the reset hook for a renderer's mode, replacing any previous one
    pub fn on_reset<F>(&mut self, mode: PanelMode, hook: F)
    where
        F: FnMut() + 'static,
    {
        self.reset_hooks.insert(mode, Box::new(hook));
    }

    /// Transition the panel into `mode`
    pub fn setup<H>(&mut self, host: &mut H, mode: PanelMode, css_class: &str, title: &str)
    where
        H: HostDocument + ?Sized,
    {
        let effects = self.machine.setup(mode, css_class, title);
        self.apply(host, effects);
    }

    /// Tear down the current mode without entering a new one
    pub fn cleanup<H>(&mut self, host: &mut H)
    where
        H: HostDocument + ?Sized,
    {
        let effects = self.machine.cleanup();
        self.apply(host, effects);
    }

    /// Clean up and hide the panel
    pub fn close<H>(&mut self, host: &mut H)
    where
        H: HostDocument + ?Sized,
    {
        let effects = self.machine.close();
        self.apply(host, effects);
    }

    /// Record the block being edited (block mode only)
    pub fn activate_block(&mut self, id: impl Into<String>, element: ElementId) -> bool {
        self.machine.activate_block(id, element)
    }

    fn apply<H>(&mut self, host: &mut H, effects: Vec<PanelEffect>)
    where
        H: HostDocument + ?Sized,
    {
        for effect in effects {
            if let Err(e) = self.apply_one(host, &effect) {
                warn!(effect = ?effect, error = %e, "Panel effect failed");
            }
        }
    }

    fn apply_one<H>(&mut self, host: &mut H, effect: &PanelEffect) -> CommonResult<()>
    where
        H: HostDocument + ?Sized,
    {
        match effect {
            PanelEffect::EnsureSurface => {
                if self.handles.is_none() {
                    self.handles = Some(build_panel(host)?);
                }
            }
            PanelEffect::ResetRenderer(mode) => {
                if let Some(hook) = self.reset_hooks.get_mut(mode) {
                    debug!(mode = %mode, "Resetting renderer");
                    hook();
                }
            }
            PanelEffect::StripClasses { element, classes } => {
                for class in classes {
                    host.remove_class(*element, class)?;
                }
            }
            PanelEffect::DockDocument | PanelEffect::UndockDocument => match host.body() {
                Some(body) if *effect == PanelEffect::DockDocument => host.add_class(body, DOCKED_CLASS)?,
                Some(body) => host.remove_class(body, DOCKED_CLASS)?,
                None => warn!("Document has no body to dock the panel into"),
            },
            _ => {
                let Some(handles) = self.handles else {
                    debug!(effect = ?effect, "Panel not built, skipping");
                    return Ok(());
                };
                apply_to_panel(host, &handles, effect)?;
            }
        }
        Ok(())
    }
}

fn apply_to_panel<H>(host: &mut H, handles: &PanelHandles, effect: &PanelEffect) -> CommonResult<()>
where
    H: HostDocument + ?Sized,
{
    match effect {
        PanelEffect::ClearTabs => host.clear_children(handles.tabs),
        PanelEffect::ClearFooterStatus => host.clear_children(handles.status),
        PanelEffect::OpenSurface => host.add_class(handles.root, OPEN_CLASS),
        PanelEffect::CloseSurface => host.remove_class(handles.root, OPEN_CLASS),
        PanelEffect::RemoveSurfaceClasses(classes) => {
            for class in classes {
                host.remove_class(handles.root, class)?;
            }
            Ok(())
        }
        PanelEffect::AddSurfaceClass(class) => host.add_class(handles.root, class),
        PanelEffect::SetTitle(title) => host.set_text(handles.title, title),
        // Handled without panel handles
        PanelEffect::EnsureSurface
        | PanelEffect::ResetRenderer(_)
        | PanelEffect::StripClasses { .. }
        | PanelEffect::DockDocument
        | PanelEffect::UndockDocument => Ok(()),
    }
}

fn build_panel<H>(host: &mut H) -> CommonResult<PanelHandles>
where
    H: HostDocument + ?Sized,
{
    let root = element(host, "aside", PANEL_CLASS)?;
    let header = element(host, "header", "gbn-panel-header")?;
    let title = element(host, "h2", "gbn-panel-title")?;
    let tabs = element(host, "nav", "gbn-panel-tabs")?;
    let body = element(host, "div", "gbn-panel-body")?;
    let footer = element(host, "footer", "gbn-panel-footer")?;
    let status = element(host, "div", "gbn-panel-status")?;

    host.append_child(header, title)?;
    host.append_child(root, header)?;
    host.append_child(root, tabs)?;
    host.append_child(root, body)?;
    host.append_child(footer, status)?;
    host.append_child(root, footer)?;

    match host.body() {
        Some(page_body) => host.append_child(page_body, root)?,
        None => warn!("Document has no body, panel left detached"),
    }

    debug!(root = %root, "Built editing panel");
    Ok(PanelHandles {
        root,
        title,
        tabs,
        body,
        footer,
        status,
    })
}

fn element<H>(host: &mut H, tag: &str, class: &str) -> CommonResult<ElementId>
where
    H: HostDocument + ?Sized,
{
    let el = host.create_element(tag);
    host.add_class(el, class)?;
    Ok(el)
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::with_config(&EditorConfig::default())
    }
}

impl fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeManager")
            .field("machine", &self.machine)
            .field("handles", &self.handles)
            .field("reset_hooks", &self.reset_hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbn_common::Dom;
    use std::cell::Cell;
    use std::rc::Rc;

    fn page() -> (Dom, ElementId) {
        let mut dom = Dom::new();
        let html = dom.append_element(dom.root(), "html").unwrap();
        let body = dom.append_element(html, "body").unwrap();
        (dom, body)
    }

    #[test]
    fn test_setup_builds_panel_once() {
        let (mut dom, body) = page();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Page, "gbn-panel-page", "Page settings");
        let handles = manager.handles().unwrap();
        manager.setup(&mut dom, PanelMode::Restore, "gbn-panel-restore", "Restore");

        assert_eq!(manager.handles(), Some(handles));
        assert_eq!(dom.parent(handles.root), Some(body));
        assert_eq!(dom.children(body).len(), 1);
        assert_eq!(dom.text(handles.title), Some("Restore"));
        assert!(dom.has_class(handles.root, OPEN_CLASS));
        assert!(dom.has_class(body, DOCKED_CLASS));
    }

    #[test]
    fn test_theme_to_block_leaves_no_theme_residue() {
        let (mut dom, _) = page();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Theme, "gbn-panel-theme", "Theme");
        let handles = manager.handles().unwrap();
        // Theme renderer fills in its tabs and a footer button
        dom.append_element(handles.tabs, "button").unwrap();
        dom.append_element(handles.tabs, "button").unwrap();
        dom.append_element(handles.status, "button").unwrap();

        manager.setup(&mut dom, PanelMode::Block, "gbn-panel-block", "Menu");

        assert!(!dom.has_class(handles.root, "gbn-panel-theme"));
        assert!(dom.has_class(handles.root, "gbn-panel-block"));
        assert!(dom.children(handles.tabs).is_empty());
        assert!(dom.children(handles.status).is_empty());
    }

    #[test]
    fn test_theme_reset_hook_runs_on_leaving_theme() {
        let (mut dom, _) = page();
        let mut manager = ModeManager::default();
        let resets = Rc::new(Cell::new(0));
        let counter = Rc::clone(&resets);
        manager.on_reset(PanelMode::Theme, move || counter.set(counter.get() + 1));

        manager.setup(&mut dom, PanelMode::Theme, "gbn-panel-theme", "Theme");
        assert_eq!(resets.get(), 0);

        manager.setup(&mut dom, PanelMode::Page, "gbn-panel-page", "Page");
        assert_eq!(resets.get(), 1);

        manager.setup(&mut dom, PanelMode::Block, "gbn-panel-block", "Block");
        assert_eq!(resets.get(), 1);
    }

    #[test]
    fn test_panel_keeps_own_classes_across_transitions() {
        let (mut dom, _) = page();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Page, PANEL_CLASS, "Page");
        manager.setup(&mut dom, PanelMode::Restore, OPEN_CLASS, "Restore");
        manager.setup(&mut dom, PanelMode::Block, "gbn-panel-block", "Block");

        let root = manager.handles().unwrap().root;
        assert!(dom.has_class(root, PANEL_CLASS));
        assert!(dom.has_class(root, OPEN_CLASS));
        assert!(dom.has_class(root, "gbn-panel-block"));
    }

    #[test]
    fn test_cleanup_strips_simulated_states() {
        let (mut dom, body) = page();
        let region = dom.append_element(body, "div").unwrap();
        dom.add_class(region, "gbn-simulate-hover").unwrap();
        dom.add_class(region, "keep-me").unwrap();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Block, "gbn-panel-block", "Block");
        assert!(manager.activate_block("gbn-1", region));
        manager.setup(&mut dom, PanelMode::Theme, "gbn-panel-theme", "Theme");

        assert_eq!(dom.classes(region), vec!["keep-me"]);
        assert!(manager.active_block().is_none());
    }

    #[test]
    fn test_close_undocks() {
        let (mut dom, body) = page();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Page, "gbn-panel-page", "Page");
        manager.close(&mut dom);

        let handles = manager.handles().unwrap();
        assert_eq!(manager.mode(), PanelMode::Idle);
        assert!(!dom.has_class(handles.root, OPEN_CLASS));
        assert!(!dom.has_class(handles.root, "gbn-panel-page"));
        assert!(!dom.has_class(body, DOCKED_CLASS));
    }

    #[test]
    fn test_missing_active_element_does_not_abort_transition() {
        let (mut dom, _) = page();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Block, "gbn-panel-block", "Block");
        manager.activate_block("gbn-ghost", ElementId(9_999));
        manager.setup(&mut dom, PanelMode::Page, "gbn-panel-page", "Page");

        let handles = manager.handles().unwrap();
        assert_eq!(manager.mode(), PanelMode::Page);
        assert!(dom.has_class(handles.root, "gbn-panel-page"));
    }

    #[test]
    fn test_bodyless_document_still_gets_a_panel() {
        let mut dom = Dom::new();
        let mut manager = ModeManager::default();

        manager.setup(&mut dom, PanelMode::Theme, "gbn-panel-theme", "Theme");

        let handles = manager.handles().unwrap();
        assert_eq!(dom.parent(handles.root), None);
        assert_eq!(dom.text(handles.title), Some("Theme"));
    }
}
