//! Adaptor for windows that export menu models plus action groups.

use std::mem;

use action_group::ActionGroupProxy;
use appmenu_bus::{BusName, Endpoint};
use tracing::{debug, warn};

use super::{AdaptorEvent, Backends, EndpointSet, MenuRole, MenuSource, session::ImportSession};
use crate::importer::{ImportRequest, ItemId, MenuItem};

/// Menubar and application menu imported from a unique bus name, with items
/// activated through the `app.`, `win.` and `unity.` action groups.
#[derive(Debug)]
pub struct AlternateAdaptor {
    /// Shared collaborators.
    backends: Backends,
    /// What we are attached to.
    current: Option<(BusName, EndpointSet)>,
    /// Open import, when the menubar could be imported.
    session: Option<ImportSession>,
    /// One proxy per advertised action group.
    proxies: Vec<(MenuRole, ActionGroupProxy)>,
    /// Events produced outside of a pump.
    events: Vec<AdaptorEvent>,
}

impl AlternateAdaptor {
    /// A detached adaptor.
    pub fn new(backends: Backends) -> Self {
        Self {
            backends,
            current: None,
            session: None,
            proxies: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Proxy for the action group with `role`.
    pub fn proxy(&self, role: MenuRole) -> Option<&ActionGroupProxy> {
        self.proxies
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, proxy)| proxy)
    }

    /// Drop the import and proxies, reporting loss of the menu and every
    /// cached action.
    fn teardown(&mut self) {
        if let Some(session) = self.session.take()
            && session.available()
        {
            self.events.push(AdaptorEvent::MenuAvailableChanged(false));
        }
        for (role, mut proxy) in self.proxies.drain(..) {
            proxy.stop();
            self.events.extend(
                proxy
                    .pump()
                    .into_iter()
                    .map(|event| AdaptorEvent::Action { role, event }),
            );
        }
        self.current = None;
    }

    /// Start one proxy per advertised action group.
    fn start_proxies(&mut self, bus_name: &BusName, endpoints: &EndpointSet) {
        for role in MenuRole::ACTION_GROUPS {
            let Some(path) = endpoints.get(role) else {
                continue;
            };
            let endpoint = Endpoint::new(bus_name.clone(), path.clone());
            let mut proxy = ActionGroupProxy::new(
                self.backends.actions.clone(),
                endpoint,
                self.backends.waker.clone(),
            );
            proxy.start();
            self.proxies.push((role, proxy));
        }
    }
}

impl MenuSource for AlternateAdaptor {
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
        self.start_proxies(bus_name, endpoints);

        let Some(menu_path) = endpoints.get(MenuRole::MenuBar) else {
            warn!(%bus_name, "no menubar path advertised");
            return;
        };
        debug!(
            %bus_name,
            path = %menu_path,
            groups = self.proxies.len(),
            "attaching alternate menu"
        );
        let request = ImportRequest {
            bus_name: bus_name.clone(),
            menu_path: menu_path.clone(),
            app_menu_path: endpoints.get(MenuRole::AppMenu).cloned(),
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
        let Some(found) = self.session.as_ref().and_then(|s| s.find_item(item)) else {
            debug!(%item, "trigger for unknown item");
            return false;
        };
        let Some(action) = found.action.as_deref() else {
            debug!(%item, "item has no action");
            return false;
        };
        let Some((prefix, name)) = action.split_once('.') else {
            warn!(action, "action without a namespace");
            return false;
        };
        let Some(proxy) = MenuRole::for_action_prefix(prefix).and_then(|r| self.proxy(r)) else {
            warn!(action, "no action group for namespace");
            return false;
        };
        proxy.activate_action(name, found.target.as_ref());
        true
    }

    fn pump(&mut self) -> Vec<AdaptorEvent> {
        let mut events = mem::take(&mut self.events);
        if let Some(session) = &mut self.session {
            events.extend(session.pump());
        }
        for (role, proxy) in &mut self.proxies {
            let role = *role;
            events.extend(
                proxy
                    .pump()
                    .into_iter()
                    .map(|event| AdaptorEvent::Action { role, event }),
            );
        }
        events
    }
}
