//! Configuration for the appmenu bridge, stored as RON.
//!
//! Every field has a default, so an absent file or an empty `()` document is
//! a complete configuration. Unknown fields are rejected.
#![warn(missing_docs)]

mod defaults;
mod error;
mod loader;
mod types;

pub use defaults::{
    APP_MENU_OBJECT_PATH, APPLICATION_OBJECT_PATH, MENUBAR_OBJECT_PATH, NATIVE_OBJECT_PATH,
    NATIVE_SERVICE_NAME, UNIQUE_BUS_NAME, UNITY_OBJECT_PATH, WINDOW_OBJECT_PATH,
};
pub use error::Error;
pub use loader::{
    CONFIG_ENV, config_path_from, default_config_path, load, load_from_path, load_from_str,
    to_ron,
};
pub use types::{Config, PropertyNames, SelectorRules};
