//! Identifiers for remote bus objects and desktop windows.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A bus connection name, either well-known (`org.kde.foo`) or unique (`:1.42`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BusName(String);

impl BusName {
    /// Construct a bus name from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty name, which never identifies a peer.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for BusName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for BusName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BusName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Path of an exported object, e.g. `/org/appmenu/menubar`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Construct an object path without validating it.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Borrow the raw path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no path was supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the object path grammar: `/` alone, or `/`-separated non-empty
    /// segments of `[A-Za-z0-9_]` without a trailing slash.
    pub fn is_valid(&self) -> bool {
        let s = self.0.as_str();
        if s == "/" {
            return true;
        }
        let Some(rest) = s.strip_prefix('/') else {
            return false;
        };
        rest.split('/').all(|seg| {
            !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        })
    }
}

impl Display for ObjectPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ObjectPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A (bus name, object path) pair identifying one remotely exported object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    /// Connection that exports the object.
    pub bus_name: BusName,
    /// Path of the object on that connection.
    pub path: ObjectPath,
}

impl Endpoint {
    /// Construct an endpoint.
    pub fn new(bus_name: impl Into<BusName>, path: impl Into<ObjectPath>) -> Self {
        Self {
            bus_name: bus_name.into(),
            path: path.into(),
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.bus_name, self.path)
    }
}

/// Identifier of a top-level desktop window as reported by the window system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Wrap a raw window-system identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw window-system identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for WindowId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<WindowId> for u64 {
    fn from(value: WindowId) -> Self {
        value.raw()
    }
}

impl Display for WindowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "0x{:x}", self.0)
    }
}
