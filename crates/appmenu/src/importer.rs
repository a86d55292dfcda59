//! Menu-import collaborator: the remote menu model as seen by adaptors.
//!
//! The bus client owns the wire protocol for menus. Adaptors only ask it to
//! open a model for an endpoint, request menu updates, read the items it has
//! cached, and activate items. Update completions arrive asynchronously as
//! [`ImportEvent`]s on the sink handed to [`MenuImportService::open`].

use std::fmt::{Display, Formatter, Result as FmtResult};

use appmenu_bus::{BusError, BusName, EventSink, ObjectPath};
use appmenu_variant::Value;

/// Identifier of one (sub)menu inside an imported model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(pub u64);

impl MenuId {
    /// The conventional root menu.
    pub const ROOT: Self = Self(0);
}

impl Display for MenuId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "menu#{}", self.0)
    }
}

/// Identifier of one item, unique within an imported model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "item#{}", self.0)
    }
}

/// A cached menu item.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuItem {
    /// Stable identifier.
    pub id: ItemId,
    /// Label with mnemonics already resolved.
    pub text: String,
    /// Submenu opened by this item, if any.
    pub submenu: Option<MenuId>,
    /// Namespaced action name (`app.quit`), for action-based menus.
    pub action: Option<String>,
    /// Parameter passed when the action is activated.
    pub target: Option<Value>,
    /// Whether the item can be activated.
    pub enabled: bool,
}

impl MenuItem {
    /// An enabled leaf item.
    pub fn new(id: ItemId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            submenu: None,
            action: None,
            target: None,
            enabled: true,
        }
    }

    /// Attach a submenu.
    pub fn with_submenu(mut self, menu: MenuId) -> Self {
        self.submenu = Some(menu);
        self
    }

    /// Attach a namespaced action and optional target.
    pub fn with_action(mut self, action: impl Into<String>, target: Option<Value>) -> Self {
        self.action = Some(action.into());
        self.target = target;
        self
    }
}

/// Asynchronous notifications from an open import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportEvent {
    /// The cached contents of a menu were (re)loaded.
    MenuUpdated(MenuId),
}

/// What to import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRequest {
    /// Connection exporting the menu.
    pub bus_name: BusName,
    /// Path of the menu model.
    pub menu_path: ObjectPath,
    /// Separate application menu merged into the model, when advertised.
    pub app_menu_path: Option<ObjectPath>,
}

/// Factory for imported menu models.
pub trait MenuImportService: Send + Sync {
    /// Open a model. Update completions are delivered to `sink` until the
    /// returned import is dropped.
    fn open(
        &self,
        request: &ImportRequest,
        sink: EventSink<ImportEvent>,
    ) -> Result<Box<dyn MenuImport>, BusError>;
}

/// One open menu model. Dropping it releases the remote subscription.
pub trait MenuImport: Send {
    /// Root menu of this model.
    fn root(&self) -> MenuId;
    /// Cached items of `menu`; empty until the menu has been updated.
    fn items(&self, menu: MenuId) -> Vec<MenuItem>;
    /// Ask the remote side for the current contents of `menu`.
    fn update_menu(&self, menu: MenuId);
    /// Activate an item through the menu protocol.
    fn trigger(&self, item: ItemId);
}
