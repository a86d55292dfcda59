//! One open menu import and its update bookkeeping.

use std::{
    collections::{HashSet, VecDeque},
    fmt,
};

use appmenu_bus::EventQueue;
use tracing::{debug, trace, warn};

use super::{AdaptorEvent, Backends};
use crate::importer::{ImportEvent, ImportRequest, ItemId, MenuId, MenuImport, MenuItem};

/// Upper bound on menus visited when searching for an item.
const MAX_SEARCHED_MENUS: usize = 256;

/// An open import. Dropping it closes the import and discards late updates.
pub(super) struct ImportSession {
    /// The import itself.
    import: Box<dyn MenuImport>,
    /// Update completions.
    updates: EventQueue<ImportEvent>,
    /// Root has been loaded at least once.
    available: bool,
    /// Request top-level submenus after each root update.
    prefetch: bool,
}

impl ImportSession {
    /// Open an import for `request` and ask for the root menu.
    pub(super) fn open(backends: &Backends, request: &ImportRequest) -> Option<Self> {
        let updates = EventQueue::new(backends.waker.clone());
        let import = match backends.importer.open(request, updates.sink()) {
            Ok(import) => import,
            Err(e) => {
                warn!(
                    bus_name = %request.bus_name,
                    path = %request.menu_path,
                    error = %e,
                    "cannot import menu"
                );
                return None;
            }
        };
        debug!(bus_name = %request.bus_name, path = %request.menu_path, "menu import opened");
        import.update_menu(import.root());
        Some(Self {
            import,
            updates,
            available: false,
            prefetch: backends.prefetch,
        })
    }

    /// Ask for the root menu again.
    pub(super) fn refresh(&self) {
        self.import.update_menu(self.import.root());
    }

    /// True once the root menu has been loaded.
    pub(super) fn available(&self) -> bool {
        self.available
    }

    /// Root items, or nothing before the first load.
    pub(super) fn root_items(&self) -> Vec<MenuItem> {
        if !self.available {
            return Vec::new();
        }
        self.import.items(self.import.root())
    }

    /// Find a cached item anywhere in the loaded menu tree.
    pub(super) fn find_item(&self, id: ItemId) -> Option<MenuItem> {
        let mut queue = VecDeque::from([self.import.root()]);
        let mut seen = HashSet::new();
        while let Some(menu) = queue.pop_front() {
            if !seen.insert(menu) || seen.len() > MAX_SEARCHED_MENUS {
                continue;
            }
            for item in self.import.items(menu) {
                if item.id == id {
                    return Some(item);
                }
                queue.extend(item.submenu);
            }
        }
        None
    }

    /// Request the submenu opened by `id`.
    pub(super) fn expand(&self, id: ItemId) -> bool {
        match self.find_item(id).and_then(|item| item.submenu) {
            Some(menu) => {
                trace!(%id, %menu, "expanding");
                self.import.update_menu(menu);
                true
            }
            None => {
                debug!(%id, "nothing to expand");
                false
            }
        }
    }

    /// Activate `id` through the menu protocol.
    pub(super) fn trigger(&self, id: ItemId) -> bool {
        if self.find_item(id).is_none() {
            debug!(%id, "trigger for unknown item");
            return false;
        }
        self.import.trigger(id);
        true
    }

    /// Apply queued update completions.
    pub(super) fn pump(&mut self) -> Vec<AdaptorEvent> {
        let root = self.import.root();
        let mut events = Vec::new();
        for ImportEvent::MenuUpdated(menu) in self.updates.drain() {
            if menu != root {
                events.push(AdaptorEvent::SubmenuUpdated(menu));
                continue;
            }
            if !self.available {
                self.available = true;
                events.push(AdaptorEvent::MenuAvailableChanged(true));
            }
            if self.prefetch {
                self.prefetch_submenus(root);
            }
            events.push(AdaptorEvent::MenuUpdated);
        }
        events
    }

    /// Request every submenu directly under `root`.
    fn prefetch_submenus(&self, root: MenuId) {
        for menu in self.import.items(root).into_iter().filter_map(|i| i.submenu) {
            self.import.update_menu(menu);
        }
    }
}

impl fmt::Debug for ImportSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportSession")
            .field("available", &self.available)
            .field("prefetch", &self.prefetch)
            .finish_non_exhaustive()
    }
}
