#![warn(missing_docs)]

//! Local proxy for a remote action group.
//!
//! An [`ActionGroupProxy`] follows one [`Endpoint`](appmenu_bus::Endpoint):
//! when the endpoint's bus name gains an owner it subscribes to change
//! signals, enumerates the actions, and from then on keeps a cache of every
//! action's enabled flag and state. Consumers see the cache evolve as a
//! stream of [`ActionEvent`]s returned from [`ActionGroupProxy::pump`].
//!
//! The bus itself is the [`ActionBus`] trait. With the `test-utils` feature
//! an in-memory implementation is available as `testing::FakeActionBus`.

mod bus;
mod proxy;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bus::{ActionBus, ActionDescription, ActionSignal};
pub use proxy::{ActionEvent, ActionGroupProxy, ProxyStatus, RemoteAction};
