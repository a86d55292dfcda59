//! Scoped ownership of a remote subscription.

use std::fmt;

/// Release hook run exactly once when a subscription ends.
type Release = Box<dyn FnOnce() + Send>;

/// Guard for a live subscription held by the bus client on our behalf.
///
/// The release hook runs when the guard is dropped, so tearing down the owner
/// (a proxy connection, an import session) deterministically disconnects the
/// underlying signal handlers.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    /// Hook that disconnects the remote subscription.
    release: Option<Release>,
}

impl Subscription {
    /// Wrap a release hook.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.release.is_some())
            .finish()
    }
}
