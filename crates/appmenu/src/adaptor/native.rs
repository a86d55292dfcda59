//! Adaptor for windows that export a single menubar object.

use std::mem;

use appmenu_bus::BusName;
use tracing::{debug, warn};

use super::{AdaptorEvent, Backends, EndpointSet, MenuRole, MenuSource, session::ImportSession};
use crate::importer::{ImportRequest, ItemId, MenuItem};

/// Menubar imported from a service name and object path. Items are
/// activated through the menu protocol itself.
#[derive(Debug)]
pub struct NativeAdaptor {
    /// Shared collaborators.
    backends: Backends,
    /// What we are attached to.
    current: Option<(BusName, EndpointSet)>,
    /// Open import, when the menubar could be imported.
    session: Option<ImportSession>,
    /// Events produced outside of a pump.
    events: Vec<AdaptorEvent>,
}

impl NativeAdaptor {
    /// A detached adaptor.
    pub fn new(backends: Backends) -> Self {
        Self {
            backends,
            current: None,
            session: None,
            events: Vec::new(),
        }
    }

    /// Drop the import, reporting loss of the menu.
    fn teardown(&mut self) {
        if let Some(session) = self.session.take()
            && session.available()
        {
            self.events.push(AdaptorEvent::MenuAvailableChanged(false));
        }
        self.current = None;
    }
}

impl MenuSource for NativeAdaptor {
    fn activate(&mut self, bus_name: &BusName, endpoints: &EndpointSet) {
        if let Some((name, set)) = &self.current
            && name == bus_name
            && set == endpoints
        {
            self.refresh();
            return;
        }
        self.teardown();
        self.current = Some((bus_name.clone(), endpoints.clone()));

        let Some(menu_path) = endpoints.get(MenuRole::MenuBar) else {
            warn!(%bus_name, "no menubar path advertised");
            return;
        };
        debug!(%bus_name, path = %menu_path, "attaching native menu");
        let request = ImportRequest {
            bus_name: bus_name.clone(),
            menu_path: menu_path.clone(),
            app_menu_path: None,
        };
        self.session = ImportSession::open(&self.backends, &request);
    }

    fn deactivate(&mut self) {
        self.teardown();
    }

    fn refresh(&mut self) {
        if let Some(session) = &self.session {
            session.refresh();
        }
    }

    fn menu_available(&self) -> bool {
        self.session.as_ref().is_some_and(ImportSession::available)
    }

    fn root_items(&self) -> Vec<MenuItem> {
        self.session
            .as_ref()
            .map(ImportSession::root_items)
            .unwrap_or_default()
    }

    fn bus_name(&self) -> Option<&BusName> {
        self.current.as_ref().map(|(name, _)| name)
    }

    fn expand(&self, item: ItemId) -> bool {
        self.session.as_ref().is_some_and(|s| s.expand(item))
    }

    fn trigger(&self, item: ItemId) -> bool {
        self.session.as_ref().is_some_and(|s| s.trigger(item))
    }

    fn pump(&mut self) -> Vec<AdaptorEvent> {
        let mut events = mem::take(&mut self.events);
        if let Some(session) = &mut self.session {
            events.extend(session.pump());
        }
        events
    }
}
