// Defaults for window property names and selector rules

// Native protocol: one service name plus one object path per window.
/// Native protocol service name property.
pub const NATIVE_SERVICE_NAME: &str = "_KDE_NET_WM_APPMENU_SERVICE_NAME";
/// Native protocol object path property.
pub const NATIVE_OBJECT_PATH: &str = "_KDE_NET_WM_APPMENU_OBJECT_PATH";

// Alternate protocol: unique bus name plus one path per role.
/// Alternate protocol unique bus name property.
pub const UNIQUE_BUS_NAME: &str = "_GTK_UNIQUE_BUS_NAME";
/// Alternate protocol application menu path property.
pub const APP_MENU_OBJECT_PATH: &str = "_GTK_APP_MENU_OBJECT_PATH";
/// Alternate protocol menubar path property.
pub const MENUBAR_OBJECT_PATH: &str = "_GTK_MENUBAR_OBJECT_PATH";
/// Alternate protocol application action group path property.
pub const APPLICATION_OBJECT_PATH: &str = "_GTK_APPLICATION_OBJECT_PATH";
/// Alternate protocol window action group path property.
pub const WINDOW_OBJECT_PATH: &str = "_GTK_WINDOW_OBJECT_PATH";
/// Alternate protocol unity action group path property.
pub const UNITY_OBJECT_PATH: &str = "_UNITY_OBJECT_PATH";

pub(crate) const MAX_TRANSIENT_DEPTH: usize = 16;
