#![warn(missing_docs)]

//! Application menu bridge.
//!
//! Follows the focused window, finds the menu it exports over the bus, and
//! mirrors that menu as a flat list model:
//! - [`SourceSelector`] reads window properties and picks a protocol.
//! - [`MenuAdaptor`] attaches to one application's menu objects: the native
//!   menubar, or the alternate menu models plus `app.`/`win.`/`unity.` action
//!   groups.
//! - [`AppMenuService`] runs a selector on a tokio task behind a handle.
//!
//! The bus and the window system are collaborators: [`MenuImportService`],
//! [`action_group::ActionBus`] and [`WindowMetadata`]. With the `test-utils`
//! feature, in-memory versions live in `testing`.

pub mod adaptor;
mod importer;
mod selector;
mod service;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
mod window;

pub use adaptor::{
    AdaptorEvent, AlternateAdaptor, Backends, EndpointSet, MenuAdaptor, MenuRole, MenuSource,
    NativeAdaptor, Protocol,
};
pub use importer::{
    ImportEvent, ImportRequest, ItemId, MenuId, MenuImport, MenuImportService, MenuItem,
};
pub use selector::{MenuEntry, ModelEvent, SourceSelector};
pub use service::{AppMenuHandle, AppMenuService, MenuSnapshot};
pub use window::{AtomCache, WindowInfo, WindowMetadata, WindowType, property_string};
