//! Window-metadata collaborator and helpers for reading window properties.

use std::{collections::HashMap, fmt, hash::Hash};

use appmenu_bus::WindowId;
use parking_lot::Mutex;
use tracing::trace;

/// Window type as declared by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Ordinary top-level window.
    #[default]
    Normal,
    /// Dialog box.
    Dialog,
    /// Palette or toolbox.
    Utility,
    /// Desktop background.
    Desktop,
    /// Panel or dock.
    Dock,
    /// Anything else.
    Other,
}

/// The window-manager facts the selector needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WindowInfo {
    /// Declared type.
    pub window_type: WindowType,
    /// The window asked not to be shown in the taskbar.
    pub skip_taskbar: bool,
    /// Owner window for dialogs and other transients.
    pub transient_for: Option<WindowId>,
}

impl WindowInfo {
    /// Info for a window of `window_type`.
    pub fn of_type(window_type: WindowType) -> Self {
        Self {
            window_type,
            ..Self::default()
        }
    }

    /// Mark this window transient for `owner`.
    pub fn transient_for(mut self, owner: WindowId) -> Self {
        self.transient_for = Some(owner);
        self
    }

    /// Set the skip-taskbar flag.
    pub fn skip_taskbar(mut self, skip: bool) -> Self {
        self.skip_taskbar = skip;
        self
    }
}

/// Read access to window properties and window-manager state.
pub trait WindowMetadata: Send + Sync {
    /// Raw bytes of a string property, or `None` when unset.
    fn property(&self, window: WindowId, name: &str) -> Option<Vec<u8>>;
    /// Window-manager info, or `None` when the window is gone.
    fn info(&self, window: WindowId) -> Option<WindowInfo>;
}

/// Read a string property: one trailing NUL is stripped, invalid UTF-8 is
/// replaced, and an empty value counts as unset.
pub fn property_string(meta: &dyn WindowMetadata, window: WindowId, name: &str) -> Option<String> {
    let bytes = meta.property(window, name)?;
    let bytes = bytes.strip_suffix(&[0]).unwrap_or(&bytes);
    let text = String::from_utf8_lossy(bytes).into_owned();
    (!text.is_empty()).then_some(text)
}

/// Lookup function backing an [`AtomCache`].
type Lookup<A> = Box<dyn Fn(&str) -> Option<A> + Send + Sync>;

/// Memoizing name-to-atom resolver for window-system backends.
///
/// Successful lookups are cached forever; failures are retried next time.
pub struct AtomCache<A> {
    /// Resolver for names not yet cached.
    lookup: Lookup<A>,
    /// Resolved atoms.
    atoms: Mutex<HashMap<String, A>>,
}

impl<A: Copy + Eq + Hash> AtomCache<A> {
    /// Create a cache over `lookup`.
    pub fn new(lookup: impl Fn(&str) -> Option<A> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            atoms: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `name`, consulting the backend only on a miss.
    pub fn get(&self, name: &str) -> Option<A> {
        if let Some(atom) = self.atoms.lock().get(name) {
            return Some(*atom);
        }
        let atom = (self.lookup)(name);
        match atom {
            Some(a) => {
                self.atoms.lock().insert(name.to_string(), a);
            }
            None => trace!(name, "atom lookup failed"),
        }
        atom
    }

    /// Number of cached atoms.
    pub fn len(&self) -> usize {
        self.atoms.lock().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.atoms.lock().is_empty()
    }
}

impl<A> fmt::Debug for AtomCache<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomCache")
            .field("cached", &self.atoms.lock().len())
            .finish_non_exhaustive()
    }
}
