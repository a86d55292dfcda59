//! Menu source adaptors.
//!
//! An adaptor attaches to the menu objects one application exports for one
//! protocol, keeps the imported menu warm, and reports changes as
//! [`AdaptorEvent`]s from [`MenuSource::pump`]. The selector holds at most one
//! adaptor, as a [`MenuAdaptor`].

mod alternate;
mod native;
mod session;

use std::{collections::BTreeMap, fmt, sync::Arc};

use action_group::{ActionBus, ActionEvent};
use appmenu_bus::{BusName, ObjectPath, Waker};

pub use self::{alternate::AlternateAdaptor, native::NativeAdaptor};
use crate::importer::{ItemId, MenuId, MenuImportService, MenuItem};

/// Role of one exported object in an application's menu set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MenuRole {
    /// Application menu, merged into the menubar import.
    AppMenu,
    /// The menubar model.
    MenuBar,
    /// Application-wide action group (`app.` actions).
    Application,
    /// Per-window action group (`win.` actions).
    Window,
    /// Unity action group (`unity.` actions).
    Unity,
}

impl MenuRole {
    /// Roles backed by an action group, in the order proxies are started.
    pub const ACTION_GROUPS: [Self; 3] = [Self::Application, Self::Window, Self::Unity];

    /// Action namespace routed to this role's action group.
    pub fn action_prefix(self) -> Option<&'static str> {
        match self {
            Self::Application => Some("app"),
            Self::Window => Some("win"),
            Self::Unity => Some("unity"),
            Self::AppMenu | Self::MenuBar => None,
        }
    }

    /// Role whose action group serves `prefix`.
    pub fn for_action_prefix(prefix: &str) -> Option<Self> {
        Self::ACTION_GROUPS
            .into_iter()
            .find(|role| role.action_prefix() == Some(prefix))
    }
}

/// Object paths an application advertises, by role.
///
/// Empty paths are never stored, so a role is either present with a usable
/// path or absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointSet(BTreeMap<MenuRole, ObjectPath>);

impl EndpointSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EndpointSet::insert`].
    pub fn with(mut self, role: MenuRole, path: impl Into<ObjectPath>) -> Self {
        self.insert(role, path);
        self
    }

    /// Record `path` for `role`; an empty path removes the role.
    pub fn insert(&mut self, role: MenuRole, path: impl Into<ObjectPath>) {
        let path = path.into();
        if path.is_empty() {
            self.0.remove(&role);
        } else {
            self.0.insert(role, path);
        }
    }

    /// Path for `role`, if advertised.
    pub fn get(&self, role: MenuRole) -> Option<&ObjectPath> {
        self.0.get(&role)
    }

    /// True when nothing is advertised.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Advertised roles and paths in role order.
    pub fn iter(&self) -> impl Iterator<Item = (MenuRole, &ObjectPath)> {
        self.0.iter().map(|(role, path)| (*role, path))
    }
}

/// Change reported by an adaptor.
#[derive(Clone, Debug, PartialEq)]
pub enum AdaptorEvent {
    /// The root menu became available or went away.
    MenuAvailableChanged(bool),
    /// The root menu's items were reloaded.
    MenuUpdated,
    /// A submenu's items were reloaded.
    SubmenuUpdated(MenuId),
    /// An action group proxy changed.
    Action {
        /// Group the event came from.
        role: MenuRole,
        /// The proxy event.
        event: ActionEvent,
    },
}

/// Capability shared by every adaptor.
pub trait MenuSource {
    /// Attach to `endpoints` on `bus_name`. Re-activating with the same pair
    /// only refreshes.
    fn activate(&mut self, bus_name: &BusName, endpoints: &EndpointSet);
    /// Detach. Loss of the menu and of every cached action is reported by
    /// the next pump.
    fn deactivate(&mut self);
    /// Ask for the root menu again.
    fn refresh(&mut self);
    /// True once the root menu has been loaded.
    fn menu_available(&self) -> bool;
    /// Items of the root menu; empty while unavailable.
    fn root_items(&self) -> Vec<MenuItem>;
    /// Bus name currently attached to.
    fn bus_name(&self) -> Option<&BusName>;
    /// Request the submenu opened by `item`. Returns false for leaves and
    /// unknown items.
    fn expand(&self, item: ItemId) -> bool;
    /// Activate `item`. Returns false when it could not be routed.
    fn trigger(&self, item: ItemId) -> bool;
    /// Apply queued notifications and return the resulting events.
    fn pump(&mut self) -> Vec<AdaptorEvent>;
}

/// Menu export protocol spoken by a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// Menubar exported under a service name plus one object path.
    Native,
    /// Menu models and action groups under a unique bus name.
    Alternate,
}

/// Collaborators shared by every adaptor.
#[derive(Clone)]
pub struct Backends {
    /// Opens menu imports.
    pub importer: Arc<dyn MenuImportService>,
    /// Action group bus client.
    pub actions: Arc<dyn ActionBus>,
    /// Signalled whenever any adaptor queue receives work.
    pub waker: Waker,
    /// Request every top-level submenu after each root update.
    pub prefetch: bool,
}

impl Backends {
    /// Backends with prefetching on and a fresh waker.
    pub fn new(importer: Arc<dyn MenuImportService>, actions: Arc<dyn ActionBus>) -> Self {
        Self {
            importer,
            actions,
            waker: Waker::new(),
            prefetch: true,
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("prefetch", &self.prefetch)
            .finish_non_exhaustive()
    }
}

/// The adaptor for whichever protocol the active window speaks.
#[derive(Debug)]
pub enum MenuAdaptor {
    /// See [`NativeAdaptor`].
    Native(NativeAdaptor),
    /// See [`AlternateAdaptor`].
    Alternate(AlternateAdaptor),
}

impl MenuAdaptor {
    /// A detached adaptor for `protocol`.
    pub fn new(protocol: Protocol, backends: Backends) -> Self {
        match protocol {
            Protocol::Native => Self::Native(NativeAdaptor::new(backends)),
            Protocol::Alternate => Self::Alternate(AlternateAdaptor::new(backends)),
        }
    }

    /// Protocol this adaptor speaks.
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Native(_) => Protocol::Native,
            Self::Alternate(_) => Protocol::Alternate,
        }
    }

    /// The adaptor as a trait object.
    fn source(&self) -> &dyn MenuSource {
        match self {
            Self::Native(a) => a,
            Self::Alternate(a) => a,
        }
    }

    /// The adaptor as a mutable trait object.
    fn source_mut(&mut self) -> &mut dyn MenuSource {
        match self {
            Self::Native(a) => a,
            Self::Alternate(a) => a,
        }
    }
}

impl MenuSource for MenuAdaptor {
    fn activate(&mut self, bus_name: &BusName, endpoints: &EndpointSet) {
        self.source_mut().activate(bus_name, endpoints);
    }

    fn deactivate(&mut self) {
        self.source_mut().deactivate();
    }

    fn refresh(&mut self) {
        self.source_mut().refresh();
    }

    fn menu_available(&self) -> bool {
        self.source().menu_available()
    }

    fn root_items(&self) -> Vec<MenuItem> {
        self.source().root_items()
    }

    fn bus_name(&self) -> Option<&BusName> {
        self.source().bus_name()
    }

    fn expand(&self, item: ItemId) -> bool {
        self.source().expand(item)
    }

    fn trigger(&self, item: ItemId) -> bool {
        self.source().trigger(item)
    }

    fn pump(&mut self) -> Vec<AdaptorEvent> {
        self.source_mut().pump()
    }
}
