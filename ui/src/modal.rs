//! Modal overlay bookkeeping and tab-order suspension.
//!
//! At most one modal may be mounted at a time; opening a second one is a
//! programming error and fails loudly. While a modal is open, every enabled
//! page-level control with a non-negative tab index is taken out of the tab
//! order, and closing the modal restores exactly the indices that were
//! saved.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    OpenDatabase,
    RenameVideo,
    DeleteVideo,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalError {
    #[error("a modal is already open: {0:?}")]
    AlreadyOpen(ModalKind),
}

#[derive(Debug)]
struct FocusTarget {
    name: String,
    tab_index: i32,
    disabled: bool,
    // Saved tab index while suspended; doubles as the restore marker.
    saved: Option<i32>,
}

/// Page-level focusable controls, ordered for Tab navigation.
#[derive(Debug, Default)]
pub struct FocusRegistry {
    targets: Vec<FocusTarget>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, tab_index: i32) {
        self.targets.push(FocusTarget {
            name: name.into(),
            tab_index,
            disabled: false,
            saved: None,
        });
    }

    pub fn remove(&mut self, name: &str) {
        self.targets.retain(|t| t.name != name);
    }

    pub fn set_disabled(&mut self, name: &str, disabled: bool) {
        if let Some(target) = self.targets.iter_mut().find(|t| t.name == name) {
            target.disabled = disabled;
        }
    }

    pub fn tab_index(&self, name: &str) -> Option<i32> {
        self.targets.iter().find(|t| t.name == name).map(|t| t.tab_index)
    }

    /// The next reachable control after `current` in tab order, wrapping
    /// around. `None` when nothing is reachable.
    pub fn next_after(&self, current: Option<&str>) -> Option<&str> {
        let mut reachable: Vec<&FocusTarget> = self
            .targets
            .iter()
            .filter(|t| !t.disabled && t.tab_index >= 0)
            .collect();
        reachable.sort_by_key(|t| t.tab_index);
        if reachable.is_empty() {
            return None;
        }
        let position = current.and_then(|name| reachable.iter().position(|t| t.name == name));
        let next = match position {
            Some(i) => (i + 1) % reachable.len(),
            None => 0,
        };
        Some(reachable[next].name.as_str())
    }

    /// The previous reachable control before `current`, wrapping around.
    pub fn prev_before(&self, current: Option<&str>) -> Option<&str> {
        let mut reachable: Vec<&FocusTarget> = self
            .targets
            .iter()
            .filter(|t| !t.disabled && t.tab_index >= 0)
            .collect();
        reachable.sort_by_key(|t| t.tab_index);
        if reachable.is_empty() {
            return None;
        }
        let position = current.and_then(|name| reachable.iter().position(|t| t.name == name));
        let prev = match position {
            Some(0) | None => reachable.len() - 1,
            Some(i) => i - 1,
        };
        Some(reachable[prev].name.as_str())
    }

    fn suspend(&mut self) {
        for target in &mut self.targets {
            if !target.disabled && target.tab_index >= 0 {
                target.saved = Some(target.tab_index);
                target.tab_index = -1;
            }
        }
    }

    fn restore(&mut self) {
        for target in &mut self.targets {
            if let Some(saved) = target.saved.take() {
                target.tab_index = saved;
            }
        }
    }
}

/// Owns the single modal slot and the focus registry it suspends.
#[derive(Debug, Default)]
pub struct ModalManager {
    active: Option<ModalKind>,
    focus: FocusRegistry,
}

impl ModalManager {
    pub fn new(focus: FocusRegistry) -> Self {
        Self {
            active: None,
            focus,
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<ModalKind> {
        self.active
    }

    pub fn focus(&self) -> &FocusRegistry {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusRegistry {
        &mut self.focus
    }

    /// Mounts a modal. Fails if one is already open, leaving it untouched.
    pub fn open(&mut self, kind: ModalKind) -> Result<(), ModalError> {
        if let Some(open) = self.active {
            return Err(ModalError::AlreadyOpen(open));
        }
        self.focus.suspend();
        self.active = Some(kind);
        Ok(())
    }

    /// Unmounts the active modal and restores the tab order. Safe to call
    /// with no modal open.
    pub fn close(&mut self) -> Option<ModalKind> {
        let closed = self.active.take()?;
        self.focus.restore();
        Some(closed)
    }
}
