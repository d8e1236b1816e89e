//! Global keyboard shortcuts.
//!
//! All key presses funnel through one [`CallbackRegistry`] with first-match
//! semantics. The modal Escape handler is registered ahead of the page
//! shortcut table, so an open dialog shadows page-level bindings.

use dispatch::CallbackRegistry;
use iced::keyboard::{key, Key, Modifiers};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyCombo {
    pub fn named(key: key::Named) -> Self {
        Self {
            key: Key::Named(key),
            ctrl: false,
            shift: false,
        }
    }

    pub fn shift_named(key: key::Named) -> Self {
        Self {
            key: Key::Named(key),
            ctrl: false,
            shift: true,
        }
    }

    pub fn ctrl(character: &str) -> Self {
        Self {
            key: Key::Character(character.into()),
            ctrl: true,
            shift: false,
        }
    }

    pub fn from_event(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            ctrl: modifiers.command(),
            shift: modifiers.shift(),
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        match &self.key {
            Key::Character(c) => write!(f, "{}", c.to_uppercase()),
            Key::Named(named) => write!(f, "{named:?}"),
            Key::Unidentified => write!(f, "?"),
        }
    }
}

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CloseModal,
    Back,
    ShowOpenDatabase,
    ShowSettings,
    FocusSearch,
    FocusNext,
    FocusPrevious,
    NextPage,
    PreviousPage,
    Refresh,
    RenameSelected,
    DeleteSelected,
}

/// A key press plus the dispatch-relevant UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyContext {
    pub combo: KeyCombo,
    pub modal_open: bool,
}

pub type KeyRegistry = CallbackRegistry<KeyContext, Option<Action>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("duplicate shortcut binding: {0}")]
    Duplicate(KeyCombo),
}

/// The application's keyboard dispatch, built once at startup.
pub struct Shortcuts {
    registry: KeyRegistry,
}

impl std::fmt::Debug for Shortcuts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shortcuts").finish_non_exhaustive()
    }
}

impl Shortcuts {
    /// Builds the standard binding set. Two bindings on the same combination
    /// are a construction-time error, not a runtime surprise.
    pub fn standard() -> Result<Self, ShortcutError> {
        Self::with_bindings(vec![
            (KeyCombo::named(key::Named::Escape), Action::Back),
            (KeyCombo::named(key::Named::Tab), Action::FocusNext),
            (KeyCombo::shift_named(key::Named::Tab), Action::FocusPrevious),
            (KeyCombo::named(key::Named::PageDown), Action::NextPage),
            (KeyCombo::named(key::Named::PageUp), Action::PreviousPage),
            (KeyCombo::named(key::Named::F5), Action::Refresh),
            (KeyCombo::named(key::Named::F2), Action::RenameSelected),
            (KeyCombo::named(key::Named::Delete), Action::DeleteSelected),
            (KeyCombo::ctrl("o"), Action::ShowOpenDatabase),
            (KeyCombo::ctrl("f"), Action::FocusSearch),
            (KeyCombo::ctrl(","), Action::ShowSettings),
        ])
    }

    pub fn with_bindings(bindings: Vec<(KeyCombo, Action)>) -> Result<Self, ShortcutError> {
        let mut table: HashMap<KeyCombo, Action> = HashMap::new();
        for (combo, action) in bindings {
            if table.insert(combo.clone(), action).is_some() {
                return Err(ShortcutError::Duplicate(combo));
            }
        }

        let registry = KeyRegistry::new();
        // Registered first so it pre-empts the page table while a modal is
        // open.
        registry.register(|ctx: &KeyContext| {
            if ctx.modal_open && ctx.combo == KeyCombo::named(key::Named::Escape) {
                Some(Action::CloseModal)
            } else {
                None
            }
        });
        registry.register(move |ctx: &KeyContext| {
            if ctx.modal_open {
                return None;
            }
            table.get(&ctx.combo).copied()
        });

        Ok(Self { registry })
    }

    pub fn dispatch(&self, ctx: &KeyContext) -> Option<Action> {
        self.registry.dispatch_first(ctx).flatten()
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(shortcuts: &Shortcuts, combo: KeyCombo, modal_open: bool) -> Option<Action> {
        shortcuts.dispatch(&KeyContext { combo, modal_open })
    }

    #[test]
    fn duplicate_binding_fails_at_construction() {
        let err = Shortcuts::with_bindings(vec![
            (KeyCombo::ctrl("o"), Action::ShowOpenDatabase),
            (KeyCombo::ctrl("o"), Action::ShowSettings),
        ])
        .unwrap_err();
        assert_eq!(err, ShortcutError::Duplicate(KeyCombo::ctrl("o")));
    }

    #[test]
    fn modal_escape_shadows_the_page_binding() {
        let shortcuts = Shortcuts::standard().unwrap();
        let escape = KeyCombo::named(key::Named::Escape);

        assert_eq!(press(&shortcuts, escape.clone(), true), Some(Action::CloseModal));
        assert_eq!(press(&shortcuts, escape, false), Some(Action::Back));
    }

    #[test]
    fn page_shortcuts_are_suppressed_while_a_modal_is_open() {
        let shortcuts = Shortcuts::standard().unwrap();
        assert_eq!(press(&shortcuts, KeyCombo::ctrl("o"), true), None);
        assert_eq!(
            press(&shortcuts, KeyCombo::ctrl("o"), false),
            Some(Action::ShowOpenDatabase)
        );
    }

    #[test]
    fn shift_tab_is_distinct_from_tab() {
        let shortcuts = Shortcuts::standard().unwrap();
        let tab = KeyCombo::named(key::Named::Tab);
        let shift_tab = KeyCombo::shift_named(key::Named::Tab);

        assert_eq!(press(&shortcuts, tab, false), Some(Action::FocusNext));
        assert_eq!(press(&shortcuts, shift_tab, false), Some(Action::FocusPrevious));
    }

    #[test]
    fn unbound_combination_dispatches_nothing() {
        let shortcuts = Shortcuts::standard().unwrap();
        assert_eq!(press(&shortcuts, KeyCombo::ctrl("q"), false), None);
    }

    #[test]
    fn modifier_mismatch_is_a_different_combo() {
        let shortcuts = Shortcuts::standard().unwrap();
        let plain_o = KeyCombo {
            key: Key::Character("o".into()),
            ctrl: false,
            shift: false,
        };
        assert_eq!(press(&shortcuts, plain_o, false), None);
    }
}
