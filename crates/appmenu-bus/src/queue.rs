//! Cross-thread inboxes drained on the owner context.
//!
//! Bus callbacks hold an [`EventSink`] and may push from any thread. The
//! owning component keeps the matching [`EventQueue`] and drains it from its
//! own context, so no two handlers for the same component run concurrently.
//! Every push signals the shared [`Waker`] so an async owner loop knows there
//! is work. Dropping the queue closes every sink: late notifications for a
//! torn-down subscription are discarded at the send site.

use std::{fmt, sync::Arc};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tokio::sync::Notify;

/// Wake signal shared by every queue feeding one owner loop.
#[derive(Clone, Default)]
pub struct Waker(Arc<Notify>);

impl Waker {
    /// Create a new, unsignalled waker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the owner. A signal raised while nobody waits is kept until the
    /// next [`Waker::wait`].
    pub fn wake(&self) {
        self.0.notify_one();
    }

    /// Wait for the next signal.
    pub async fn wait(&self) {
        self.0.notified().await;
    }
}

impl fmt::Debug for Waker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waker").finish_non_exhaustive()
    }
}

/// Owner side of an inbox.
pub struct EventQueue<T> {
    /// Template sender cloned into sinks.
    tx: Sender<T>,
    /// Receiver drained by the owner.
    rx: Receiver<T>,
    /// Waker signalled by sinks on every push.
    waker: Waker,
}

impl<T> EventQueue<T> {
    /// Create an empty queue that signals `waker` on push.
    pub fn new(waker: Waker) -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, waker }
    }

    /// Producer handle for this queue.
    pub fn sink(&self) -> EventSink<T> {
        EventSink {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Take every pending event in arrival order.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Waker shared with this queue's sinks.
    pub fn waker(&self) -> &Waker {
        &self.waker
    }
}

impl<T> fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.rx.len())
            .finish_non_exhaustive()
    }
}

/// Producer side of an inbox; cheap to clone and `Send` for `T: Send`.
pub struct EventSink<T> {
    /// Channel into the owner's queue.
    tx: Sender<T>,
    /// Owner wake signal.
    waker: Waker,
}

impl<T> EventSink<T> {
    /// Deliver an event. Returns `false` when the owning queue is gone, in
    /// which case the event is dropped.
    pub fn send(&self, event: T) -> bool {
        if self.tx.send(event).is_err() {
            return false;
        }
        self.waker.wake();
        true
    }
}

impl<T> Clone for EventSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }
}

impl<T> fmt::Debug for EventSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn drain_preserves_order_across_threads() {
        let queue = EventQueue::new(Waker::new());
        let sink = queue.sink();
        let handle = thread::spawn(move || {
            for i in 0..5 {
                assert!(sink.send(i));
            }
        });
        handle.join().unwrap();
        assert_eq!(queue.drain(), vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn sink_reports_closed_queue() {
        let queue: EventQueue<u8> = EventQueue::new(Waker::new());
        let sink = queue.sink();
        drop(queue);
        assert!(!sink.send(1));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn push_wakes_owner() {
        let waker = Waker::new();
        let queue = EventQueue::new(waker.clone());
        queue.sink().send("ping");
        tokio::time::timeout(Duration::from_millis(200), waker.wait())
            .await
            .expect("waker signalled");
        assert_eq!(queue.drain(), vec!["ping"]);
    }
}
