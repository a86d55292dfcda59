//! In-memory collaborators for tests.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use appmenu_bus::{BusError, Endpoint, EventSink, WindowId};
use parking_lot::Mutex;

use crate::{
    importer::{ImportEvent, ImportRequest, ItemId, MenuId, MenuImport, MenuImportService, MenuItem},
    window::{WindowInfo, WindowMetadata},
};

/// Menus exported at one endpoint.
type MenuTree = BTreeMap<MenuId, Vec<MenuItem>>;

/// Shared state behind [`FakeMenuImporter`].
#[derive(Default)]
struct ImporterInner {
    /// Exported menu trees.
    trees: HashMap<Endpoint, MenuTree>,
    /// Imports currently open.
    open: usize,
    /// Total successful opens.
    opened: usize,
    /// Last request passed to `open`.
    last_request: Option<ImportRequest>,
    /// Update sinks of open imports, by import id.
    sinks: Vec<(u64, Endpoint, EventSink<ImportEvent>)>,
    /// Next import id.
    next_id: u64,
    /// Human-readable call log.
    calls: Vec<String>,
}

/// Scriptable menu importer. Every `update_menu` completes immediately by
/// queueing `MenuUpdated` unless replies are held.
#[derive(Clone, Default)]
pub struct FakeMenuImporter {
    /// Shared state; imports hold a clone.
    inner: Arc<Mutex<ImporterInner>>,
    /// Make `open` fail.
    fail_open: Arc<AtomicBool>,
    /// Suppress update completions.
    hold_replies: Arc<AtomicBool>,
}

impl FakeMenuImporter {
    /// An importer exporting nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `items` as `menu` at `endpoint`.
    pub fn set_menu(&self, endpoint: &Endpoint, menu: MenuId, items: Vec<MenuItem>) {
        self.inner
            .lock()
            .trees
            .entry(endpoint.clone())
            .or_default()
            .insert(menu, items);
    }

    /// Imports currently open.
    pub fn open_count(&self) -> usize {
        self.inner.lock().open
    }

    /// Successful opens so far.
    pub fn opened(&self) -> usize {
        self.inner.lock().opened
    }

    /// Last request passed to `open`.
    pub fn last_request(&self) -> Option<ImportRequest> {
        self.inner.lock().last_request.clone()
    }

    /// Snapshot of recorded calls.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    /// Number of recorded calls equal to `s`.
    pub fn call_count(&self, s: &str) -> usize {
        self.inner.lock().calls.iter().filter(|c| *c == s).count()
    }

    /// Check whether any call contains `s`.
    pub fn calls_contains(&self, s: &str) -> bool {
        self.inner.lock().calls.iter().any(|c| c.contains(s))
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Deliver an unsolicited update of `menu` to every import of
    /// `endpoint`. Returns the number of imports notified.
    pub fn notify_updated(&self, endpoint: &Endpoint, menu: MenuId) -> usize {
        let g = self.inner.lock();
        g.sinks
            .iter()
            .filter(|(_, ep, _)| ep == endpoint)
            .filter(|(_, _, sink)| sink.send(ImportEvent::MenuUpdated(menu)))
            .count()
    }

    /// Make `open` fail.
    pub fn set_fail_open(&self, v: bool) {
        self.fail_open.store(v, Ordering::SeqCst);
    }

    /// Stop completing updates.
    pub fn set_hold_replies(&self, v: bool) {
        self.hold_replies.store(v, Ordering::SeqCst);
    }
}

impl MenuImportService for FakeMenuImporter {
    fn open(
        &self,
        request: &ImportRequest,
        sink: EventSink<ImportEvent>,
    ) -> Result<Box<dyn MenuImport>, BusError> {
        let endpoint = Endpoint::new(request.bus_name.clone(), request.menu_path.clone());
        let mut g = self.inner.lock();
        g.calls.push(format!("open {endpoint}"));
        g.last_request = Some(request.clone());
        if self.fail_open.load(Ordering::SeqCst) || !g.trees.contains_key(&endpoint) {
            return Err(BusError::NoSuchObject(endpoint));
        }
        g.open += 1;
        g.opened += 1;
        let id = g.next_id;
        g.next_id += 1;
        g.sinks.push((id, endpoint.clone(), sink.clone()));
        Ok(Box::new(FakeImport {
            id,
            inner: self.inner.clone(),
            hold_replies: self.hold_replies.clone(),
            endpoint,
            sink,
        }))
    }
}

/// One open fake import.
struct FakeImport {
    /// Registration id.
    id: u64,
    /// Importer state.
    inner: Arc<Mutex<ImporterInner>>,
    /// Shared with the importer.
    hold_replies: Arc<AtomicBool>,
    /// Endpoint this import reads.
    endpoint: Endpoint,
    /// Update completions.
    sink: EventSink<ImportEvent>,
}

impl MenuImport for FakeImport {
    fn root(&self) -> MenuId {
        MenuId::ROOT
    }

    fn items(&self, menu: MenuId) -> Vec<MenuItem> {
        self.inner
            .lock()
            .trees
            .get(&self.endpoint)
            .and_then(|tree| tree.get(&menu))
            .cloned()
            .unwrap_or_default()
    }

    fn update_menu(&self, menu: MenuId) {
        self.inner
            .lock()
            .calls
            .push(format!("update {} {}", self.endpoint, menu.0));
        if !self.hold_replies.load(Ordering::SeqCst) {
            self.sink.send(ImportEvent::MenuUpdated(menu));
        }
    }

    fn trigger(&self, item: ItemId) {
        self.inner
            .lock()
            .calls
            .push(format!("trigger {} {}", self.endpoint, item.0));
    }
}

impl Drop for FakeImport {
    fn drop(&mut self) {
        let mut g = self.inner.lock();
        g.open -= 1;
        g.sinks.retain(|(id, _, _)| *id != self.id);
        g.calls.push(format!("close {}", self.endpoint));
    }
}

/// One fake window.
#[derive(Clone, Default)]
struct FakeWindow {
    /// Window-manager info.
    info: WindowInfo,
    /// Raw property bytes.
    props: HashMap<String, Vec<u8>>,
}

/// Scriptable window metadata.
#[derive(Clone, Default)]
pub struct FakeWindowMetadata {
    /// Known windows.
    windows: Arc<Mutex<HashMap<WindowId, FakeWindow>>>,
}

impl FakeWindowMetadata {
    /// No windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a window.
    pub fn add_window(&self, window: WindowId, info: WindowInfo) {
        self.windows.lock().insert(
            window,
            FakeWindow {
                info,
                props: HashMap::new(),
            },
        );
    }

    /// Forget a window.
    pub fn remove_window(&self, window: WindowId) {
        self.windows.lock().remove(&window);
    }

    /// Set a string property the way clients do, with a trailing NUL.
    pub fn set_property(&self, window: WindowId, name: &str, value: &str) {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.set_raw_property(window, name, bytes);
    }

    /// Set a property's raw bytes.
    pub fn set_raw_property(&self, window: WindowId, name: &str, bytes: Vec<u8>) {
        self.windows
            .lock()
            .entry(window)
            .or_default()
            .props
            .insert(name.to_string(), bytes);
    }
}

impl WindowMetadata for FakeWindowMetadata {
    fn property(&self, window: WindowId, name: &str) -> Option<Vec<u8>> {
        self.windows.lock().get(&window)?.props.get(name).cloned()
    }

    fn info(&self, window: WindowId) -> Option<WindowInfo> {
        self.windows.lock().get(&window).map(|w| w.info)
    }
}
