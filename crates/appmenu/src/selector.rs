//! Chooses the menu source for the focused window and exposes its root
//! menu as a flat list model.

use std::{collections::HashSet, fmt, mem, sync::Arc};

use appmenu_bus::{BusName, NameOwnerChanged, ObjectPath, Waker, WindowId};
use appmenu_config::{Config, PropertyNames, SelectorRules};
use tracing::{debug, trace, warn};

use crate::{
    adaptor::{
        AdaptorEvent, Backends, EndpointSet, MenuAdaptor, MenuRole, MenuSource, Protocol,
    },
    importer::{ItemId, MenuId},
    window::{WindowInfo, WindowMetadata, WindowType, property_string},
};

/// Change to the list model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    /// The source changed or went away; every row is gone.
    Reset,
    /// The menu became available or unavailable.
    MenuAvailableChanged(bool),
    /// The root items were reloaded.
    RowsChanged,
    /// A submenu was reloaded.
    SubmenuUpdated(MenuId),
}

/// One row of the list model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Label.
    pub text: String,
    /// Handle passed back to `expand` and `trigger`.
    pub id: ItemId,
}

/// A window's advertised menu source.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Candidate {
    /// Protocol to speak.
    protocol: Protocol,
    /// Connection exporting the menu.
    bus_name: BusName,
    /// Advertised object paths.
    endpoints: EndpointSet,
}

/// Follows window focus and keeps at most one adaptor attached.
pub struct SourceSelector {
    /// Property names to read.
    properties: PropertyNames,
    /// Rejection rules and walk bounds.
    rules: SelectorRules,
    /// Collaborators for adaptors.
    backends: Backends,
    /// Window metadata.
    metadata: Arc<dyn WindowMetadata>,
    /// The active adaptor.
    adaptor: Option<MenuAdaptor>,
    /// Last window accepted for selection.
    last_window: Option<WindowId>,
    /// Events produced outside of a pump.
    events: Vec<ModelEvent>,
}

impl SourceSelector {
    /// A selector with nothing selected.
    pub fn new(config: &Config, mut backends: Backends, metadata: Arc<dyn WindowMetadata>) -> Self {
        backends.prefetch = config.prefetch_submenus;
        Self {
            properties: config.properties.clone(),
            rules: config.selector.clone(),
            backends,
            metadata,
            adaptor: None,
            last_window: None,
            events: Vec::new(),
        }
    }

    /// Waker signalled whenever an adaptor has queued work for [`Self::pump`].
    pub fn waker(&self) -> Waker {
        self.backends.waker.clone()
    }

    /// Select the menu source for a newly focused window.
    ///
    /// Rejected windows leave the current menu in place. A window without
    /// metadata is treated as a normal window with no menu.
    pub fn on_active_window_changed(&mut self, window: WindowId) {
        let info = self.metadata.info(window).unwrap_or_else(|| {
            debug!(%window, "no info for focused window");
            WindowInfo::default()
        });
        if self.is_rejected(&info) {
            trace!(%window, ?info, "focused window rejected");
            return;
        }
        self.last_window = Some(window);
        self.select_for(window, &info);
    }

    /// React to a bus-wide owner change.
    pub fn on_name_owner_changed(&mut self, change: &NameOwnerChanged) {
        if !change.is_lost() {
            return;
        }
        let active = self.adaptor.as_ref().and_then(MenuSource::bus_name);
        if active == Some(&change.name) {
            debug!(name = %change.name, "menu owner left the bus");
            self.deactivate();
        }
    }

    /// Run selection again for the last focused window.
    pub fn refresh(&mut self) {
        let Some(window) = self.last_window else {
            return;
        };
        match self.metadata.info(window) {
            Some(info) => self.select_for(window, &info),
            None => {
                debug!(%window, "last focused window is gone");
                self.deactivate();
            }
        }
    }

    /// Drop the active adaptor and clear the model.
    pub fn deactivate(&mut self) {
        if let Some(mut adaptor) = self.adaptor.take() {
            debug!(protocol = ?adaptor.protocol(), "deactivating menu source");
            adaptor.deactivate();
            // Rows are covered by the reset; drained events are only traced.
            for event in adaptor.pump() {
                trace!(?event, "drained from detached source");
            }
        }
        self.events.push(ModelEvent::Reset);
    }

    /// Rows of the root menu; empty while no menu is available.
    pub fn rows(&self) -> Vec<MenuEntry> {
        let Some(adaptor) = self.adaptor.as_ref().filter(|a| a.menu_available()) else {
            return Vec::new();
        };
        adaptor
            .root_items()
            .into_iter()
            .map(|item| MenuEntry {
                text: item.text,
                id: item.id,
            })
            .collect()
    }

    /// True when the active source has a loaded menu.
    pub fn menu_available(&self) -> bool {
        self.adaptor.as_ref().is_some_and(MenuSource::menu_available)
    }

    /// Request the submenu behind a row.
    pub fn expand(&self, item: ItemId) -> bool {
        self.adaptor.as_ref().is_some_and(|a| a.expand(item))
    }

    /// Activate a row or submenu item.
    pub fn trigger(&self, item: ItemId) -> bool {
        self.adaptor.as_ref().is_some_and(|a| a.trigger(item))
    }

    /// Protocol of the active source.
    pub fn active_protocol(&self) -> Option<Protocol> {
        self.adaptor.as_ref().map(MenuAdaptor::protocol)
    }

    /// The active adaptor.
    pub fn adaptor(&self) -> Option<&MenuAdaptor> {
        self.adaptor.as_ref()
    }

    /// Apply queued notifications and return the resulting model events.
    pub fn pump(&mut self) -> Vec<ModelEvent> {
        let mut events = mem::take(&mut self.events);
        let Some(adaptor) = &mut self.adaptor else {
            return events;
        };
        for event in adaptor.pump() {
            match event {
                AdaptorEvent::MenuAvailableChanged(available) => {
                    events.push(ModelEvent::MenuAvailableChanged(available));
                }
                AdaptorEvent::MenuUpdated => events.push(ModelEvent::RowsChanged),
                AdaptorEvent::SubmenuUpdated(menu) => {
                    events.push(ModelEvent::SubmenuUpdated(menu));
                }
                AdaptorEvent::Action { role, event } => {
                    trace!(?role, ?event, "action group changed");
                }
            }
        }
        events
    }

    /// Whether the rules exclude `info` from selection.
    fn is_rejected(&self, info: &WindowInfo) -> bool {
        (self.rules.reject_skip_taskbar && info.skip_taskbar)
            || (self.rules.reject_utility && info.window_type == WindowType::Utility)
            || (self.rules.reject_desktop && info.window_type == WindowType::Desktop)
    }

    /// Find and attach the source for `window`, or clear the model.
    fn select_for(&mut self, window: WindowId, info: &WindowInfo) {
        let found = self
            .ancestors(window, info)
            .into_iter()
            .chain([window])
            .find_map(|w| self.candidate(w).map(|c| (w, c)));
        match found {
            Some((owner, candidate)) => {
                trace!(%window, %owner, protocol = ?candidate.protocol, "menu source found");
                self.attach(&candidate);
            }
            None => {
                debug!(%window, "no menu source");
                self.deactivate();
            }
        }
    }

    /// Transient-for owners of `window`, nearest first.
    fn ancestors(&self, window: WindowId, info: &WindowInfo) -> Vec<WindowId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([window]);
        let mut next = info.transient_for;
        while let Some(owner) = next {
            if chain.len() >= self.rules.max_transient_depth {
                debug!(%window, depth = chain.len(), "transient chain truncated");
                break;
            }
            if !seen.insert(owner) {
                warn!(%window, %owner, "transient-for cycle");
                break;
            }
            chain.push(owner);
            next = self.metadata.info(owner).and_then(|i| i.transient_for);
        }
        chain
    }

    /// The source advertised on `window`, native first.
    fn candidate(&self, window: WindowId) -> Option<Candidate> {
        let read = |name: &str| property_string(self.metadata.as_ref(), window, name);
        let read_path = |name: &str| {
            let path = ObjectPath::from(read(name)?);
            if path.is_valid() {
                return Some(path);
            }
            warn!(%window, property = name, %path, "ignoring malformed object path");
            None
        };
        let props = &self.properties;

        if let Some(service) = read(&props.native_service_name) {
            let mut endpoints = EndpointSet::new();
            if let Some(path) = read_path(&props.native_object_path) {
                endpoints.insert(MenuRole::MenuBar, path);
            }
            return Some(Candidate {
                protocol: Protocol::Native,
                bus_name: BusName::new(service),
                endpoints,
            });
        }

        let bus_name = read(&props.unique_bus_name)?;
        let mut endpoints = EndpointSet::new();
        for (role, name) in [
            (MenuRole::AppMenu, &props.app_menu_path),
            (MenuRole::MenuBar, &props.menubar_path),
            (MenuRole::Application, &props.application_path),
            (MenuRole::Window, &props.window_path),
            (MenuRole::Unity, &props.unity_path),
        ] {
            if let Some(path) = read_path(name) {
                endpoints.insert(role, path);
            }
        }
        Some(Candidate {
            protocol: Protocol::Alternate,
            bus_name: BusName::new(bus_name),
            endpoints,
        })
    }

    /// Point the adaptor at `candidate`, replacing it on a protocol change.
    fn attach(&mut self, candidate: &Candidate) {
        if self
            .adaptor
            .as_ref()
            .is_some_and(|a| a.protocol() != candidate.protocol)
        {
            self.deactivate();
        }
        let adaptor = self
            .adaptor
            .get_or_insert_with(|| MenuAdaptor::new(candidate.protocol, self.backends.clone()));
        adaptor.activate(&candidate.bus_name, &candidate.endpoints);
    }
}

impl fmt::Debug for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSelector")
            .field("adaptor", &self.adaptor)
            .field("last_window", &self.last_window)
            .finish_non_exhaustive()
    }
}
