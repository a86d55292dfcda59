#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

//! Shared identifiers and event plumbing for the appmenu workspace.
//!
//! Everything that crosses the boundary between the bus client (an external
//! collaborator that may deliver notifications on its own thread) and the
//! single owner context that runs selectors, adaptors and proxies lives here:
//! - [`BusName`], [`ObjectPath`], [`Endpoint`] and [`WindowId`] identifiers.
//! - [`EventQueue`] / [`EventSink`]: cross-thread inboxes drained by the owner.
//! - [`Subscription`]: scoped release of a remote subscription.
//! - [`NameWatcher`]: the name-presence half of the bus client.

mod error;
mod ids;
mod queue;
mod subscription;

pub use error::BusError;
pub use ids::{BusName, Endpoint, ObjectPath, WindowId};
pub use queue::{EventQueue, EventSink, Waker};
pub use subscription::Subscription;

/// Presence notification for a watched bus name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameEvent {
    /// The name gained an owner (the unique connection name is attached).
    Appeared {
        /// Unique connection name of the new owner.
        owner: String,
    },
    /// The name lost its owner.
    Vanished,
}

/// Bus-wide ownership change of a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameOwnerChanged {
    /// Name whose owner changed.
    pub name: BusName,
    /// Previous owner; empty when the name was unowned.
    pub old_owner: String,
    /// New owner; empty when the name has been released.
    pub new_owner: String,
}

impl NameOwnerChanged {
    /// True when the change releases the name without a successor.
    pub fn is_lost(&self) -> bool {
        self.new_owner.is_empty()
    }
}

/// Name-presence watching provided by the bus client.
pub trait NameWatcher: Send + Sync {
    /// Watch `name`, delivering [`NameEvent`]s to `sink` until the returned
    /// subscription is dropped. If the name is already owned the client emits
    /// an initial `Appeared`.
    fn watch_name(&self, name: &BusName, sink: EventSink<NameEvent>)
    -> Result<Subscription, BusError>;
}
