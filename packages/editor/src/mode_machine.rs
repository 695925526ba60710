//! # Panel Mode Machine
//!
//! Decides which editing context owns the panel and what has to happen to
//! the page on every transition. The machine never touches the DOM: each
//! call returns an ordered list of [`PanelEffect`]s, and
//! [`ModeManager`](crate::ModeManager) applies them.
//!
//! ```text
//! setup(mode, class, title)
//!   ensure panel ─▶ cleanup(previous) ─▶ mode = new ─▶ open + dock
//!                 ─▶ drop old mode classes ─▶ add class ─▶ title
//! ```
//!
//! Every pair of modes is a legal transition, but every transition runs
//! the full cleanup before the new mode is set up. Skipping it leaves tabs
//! and buttons from the previous context on screen.

use crate::mode_manager::{OPEN_CLASS, PANEL_CLASS};
use gbn_common::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Editing context that owns the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    #[default]
    Idle,
    Block,
    Theme,
    Page,
    Restore,
}

impl PanelMode {
    pub const ALL: [PanelMode; 5] = [
        PanelMode::Idle,
        PanelMode::Block,
        PanelMode::Theme,
        PanelMode::Page,
        PanelMode::Restore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PanelMode::Idle => "idle",
            PanelMode::Block => "block",
            PanelMode::Theme => "theme",
            PanelMode::Page => "page",
            PanelMode::Restore => "restore",
        }
    }
}

impl fmt::Display for PanelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown panel mode '{}'", s))
    }
}

/// Block currently being edited in the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBlock {
    pub id: String,
    pub element: ElementId,
}

/// Side effect the executor applies to the page, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEffect {
    /// Build the panel if it doesn't exist yet
    EnsureSurface,
    /// Invoke the renderer's reset hook for the mode being left
    ResetRenderer(PanelMode),
    ClearTabs,
    ClearFooterStatus,
    /// Remove presentation classes from a block's element
    StripClasses {
        element: ElementId,
        classes: Vec<String>,
    },
    OpenSurface,
    CloseSurface,
    DockDocument,
    UndockDocument,
    RemoveSurfaceClasses(Vec<String>),
    AddSurfaceClass(String),
    SetTitle(String),
}

/// Panel state plus the bookkeeping cleanup needs
#[derive(Debug, Clone)]
pub struct ModeMachine {
    mode: PanelMode,
    active_block: Option<ActiveBlock>,
    /// Every mode class ever put on the panel root
    applied_classes: BTreeSet<String>,
    simulated_state_classes: Vec<String>,
}

impl ModeMachine {
    pub fn new(simulated_state_classes: Vec<String>) -> Self {
        Self {
            mode: PanelMode::Idle,
            active_block: None,
            applied_classes: BTreeSet::new(),
            simulated_state_classes,
        }
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    pub fn active_block(&self) -> Option<&ActiveBlock> {
        self.active_block.as_ref()
    }

    /// Tear down whatever the current mode left on the page
    pub fn cleanup(&mut self) -> Vec<PanelEffect> {
        let mut effects = Vec::new();

        if self.mode == PanelMode::Theme {
            effects.push(PanelEffect::ResetRenderer(PanelMode::Theme));
        }

        effects.push(PanelEffect::ClearTabs);
        effects.push(PanelEffect::ClearFooterStatus);

        if let Some(active) = self.active_block.take() {
            effects.push(PanelEffect::StripClasses {
                element: active.element,
                classes: self.simulated_state_classes.clone(),
            });
        }

        effects
    }

    /// Clean up, then hand the panel to `mode`
    pub fn setup(&mut self, mode: PanelMode, css_class: &str, title: &str) -> Vec<PanelEffect> {
        debug!(from = %self.mode, to = %mode, "Panel transition");

        let mut effects = vec![PanelEffect::EnsureSurface];
        effects.extend(self.cleanup());

        self.mode = mode;

        effects.push(PanelEffect::OpenSurface);
        effects.push(PanelEffect::DockDocument);
        effects.push(PanelEffect::RemoveSurfaceClasses(
            self.applied_classes.iter().cloned().collect(),
        ));
        if is_reserved_class(css_class) {
            warn!(class = css_class, "Mode class collides with a panel class, not applied");
        } else {
            self.applied_classes.insert(css_class.to_string());
            effects.push(PanelEffect::AddSurfaceClass(css_class.to_string()));
        }
        effects.push(PanelEffect::SetTitle(title.to_string()));

        effects
    }

    /// Clean up and return the panel to `idle`
    pub fn close(&mut self) -> Vec<PanelEffect> {
        debug!(from = %self.mode, "Panel closed");

        let mut effects = self.cleanup();
        self.mode = PanelMode::Idle;

        effects.push(PanelEffect::RemoveSurfaceClasses(
            self.applied_classes.iter().cloned().collect(),
        ));
        effects.push(PanelEffect::CloseSurface);
        effects.push(PanelEffect::UndockDocument);
        effects
    }

    /// Record the block being edited. Only valid in `block` mode.
    pub fn activate_block(&mut self, id: impl Into<String>, element: ElementId) -> bool {
        if self.mode != PanelMode::Block {
            warn!(mode = %self.mode, "Cannot activate a block outside block mode");
            return false;
        }
        self.active_block = Some(ActiveBlock {
            id: id.into(),
            element,
        });
        true
    }
}

/// Classes the panel root owns regardless of mode
fn is_reserved_class(class: &str) -> bool {
    class.is_empty() || class == PANEL_CLASS || class == OPEN_CLASS
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
