use serde::{Deserialize, Serialize};

use crate::defaults;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Window property names consulted during source selection.
    pub properties: PropertyNames,
    /// Window rejection rules and transient walk bounds.
    pub selector: SelectorRules,
    /// Request every top-level submenu whenever the root menu updates.
    pub prefetch_submenus: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            properties: PropertyNames::default(),
            selector: SelectorRules::default(),
            prefetch_submenus: true,
        }
    }
}

/// Names of the window properties that advertise menu endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyNames {
    /// Native protocol service name.
    pub native_service_name: String,
    /// Native protocol menu object path.
    pub native_object_path: String,
    /// Alternate protocol unique bus name.
    pub unique_bus_name: String,
    /// Alternate protocol application menu path.
    pub app_menu_path: String,
    /// Alternate protocol menubar path.
    pub menubar_path: String,
    /// Alternate protocol application action group path.
    pub application_path: String,
    /// Alternate protocol window action group path.
    pub window_path: String,
    /// Alternate protocol unity action group path.
    pub unity_path: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            native_service_name: defaults::NATIVE_SERVICE_NAME.into(),
            native_object_path: defaults::NATIVE_OBJECT_PATH.into(),
            unique_bus_name: defaults::UNIQUE_BUS_NAME.into(),
            app_menu_path: defaults::APP_MENU_OBJECT_PATH.into(),
            menubar_path: defaults::MENUBAR_OBJECT_PATH.into(),
            application_path: defaults::APPLICATION_OBJECT_PATH.into(),
            window_path: defaults::WINDOW_OBJECT_PATH.into(),
            unity_path: defaults::UNITY_OBJECT_PATH.into(),
        }
    }
}

impl PropertyNames {
    /// Every configured name with its field name, in declaration order.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("native_service_name", &self.native_service_name),
            ("native_object_path", &self.native_object_path),
            ("unique_bus_name", &self.unique_bus_name),
            ("app_menu_path", &self.app_menu_path),
            ("menubar_path", &self.menubar_path),
            ("application_path", &self.application_path),
            ("window_path", &self.window_path),
            ("unity_path", &self.unity_path),
        ]
    }
}

/// Which focused windows are ignored, and how far to follow transient chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorRules {
    /// Ignore windows that ask to be skipped by the taskbar.
    pub reject_skip_taskbar: bool,
    /// Ignore utility windows.
    pub reject_utility: bool,
    /// Ignore the desktop window.
    pub reject_desktop: bool,
    /// Maximum number of transient-for ancestors inspected.
    pub max_transient_depth: usize,
}

impl Default for SelectorRules {
    fn default() -> Self {
        Self {
            reject_skip_taskbar: true,
            reject_utility: true,
            reject_desktop: true,
            max_transient_depth: defaults::MAX_TRANSIENT_DEPTH,
        }
    }
}
