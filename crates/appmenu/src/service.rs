//! Async owner task for a [`SourceSelector`].
//!
//! The selector, its adaptor and every proxy live on one tokio task. Callers
//! talk to it through a cloneable [`AppMenuHandle`]; bus notifications reach
//! it through the shared waker and are applied between commands.

use appmenu_bus::{NameOwnerChanged, WindowId};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, trace};

use crate::{
    importer::ItemId,
    selector::{MenuEntry, ModelEvent, SourceSelector},
};

/// Model events buffered per subscriber.
const EVENT_CAPACITY: usize = 256;

/// Point-in-time view of the list model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuSnapshot {
    /// Whether a menu is loaded.
    pub available: bool,
    /// Root rows, in order.
    pub rows: Vec<MenuEntry>,
}

/// Requests handled by the owner task.
enum Command {
    /// Focus moved.
    ActiveWindowChanged(WindowId),
    /// A bus name changed owner.
    NameOwnerChanged(NameOwnerChanged),
    /// Re-run selection.
    Refresh,
    /// Load a submenu.
    Expand(ItemId),
    /// Activate an item.
    Trigger(ItemId),
    /// Report the current model.
    Snapshot {
        /// Reply channel.
        respond: oneshot::Sender<MenuSnapshot>,
    },
}

/// Cheap, clonable handle to the menu service.
#[derive(Clone, Debug)]
pub struct AppMenuHandle {
    /// Command channel into the owner task.
    tx: mpsc::UnboundedSender<Command>,
    /// Model event fan-out.
    events: broadcast::Sender<ModelEvent>,
}

impl AppMenuHandle {
    /// Subscribe to model events.
    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.events.subscribe()
    }

    /// Report a focus change.
    pub fn active_window_changed(&self, window: WindowId) {
        self.send(Command::ActiveWindowChanged(window));
    }

    /// Report a bus name owner change.
    pub fn name_owner_changed(&self, change: NameOwnerChanged) {
        self.send(Command::NameOwnerChanged(change));
    }

    /// Re-run selection for the last focused window.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Load the submenu behind `item`.
    pub fn expand(&self, item: ItemId) {
        self.send(Command::Expand(item));
    }

    /// Activate `item`.
    pub fn trigger(&self, item: ItemId) {
        self.send(Command::Trigger(item));
    }

    /// Current model, after applying every pending notification.
    pub async fn snapshot(&self) -> MenuSnapshot {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot { respond: tx });
        rx.await.unwrap_or_default()
    }

    /// Queue a command; a stopped service ignores it.
    fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            debug!("menu service stopped; command dropped");
        }
    }
}

/// Menu service constructor.
pub struct AppMenuService;

impl AppMenuService {
    /// Move `selector` onto a new task and return a handle to it. The task
    /// ends when every handle has been dropped.
    pub fn spawn(selector: SourceSelector) -> AppMenuHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (evt_tx, _evt_rx) = broadcast::channel(EVENT_CAPACITY);
        tokio::spawn(run_actor(rx, evt_tx.clone(), selector));
        AppMenuHandle { tx, events: evt_tx }
    }
}

/// Owner loop: apply commands and wake-ups, publishing model events.
async fn run_actor(
    mut rx: mpsc::UnboundedReceiver<Command>,
    events: broadcast::Sender<ModelEvent>,
    mut selector: SourceSelector,
) {
    let waker = selector.waker();
    loop {
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                handle(&mut selector, &events, cmd);
            }
            () = waker.wait() => {}
        }
        publish(&mut selector, &events);
    }
    debug!("menu service stopped");
}

/// Apply one command.
fn handle(selector: &mut SourceSelector, events: &broadcast::Sender<ModelEvent>, cmd: Command) {
    match cmd {
        Command::ActiveWindowChanged(window) => selector.on_active_window_changed(window),
        Command::NameOwnerChanged(change) => selector.on_name_owner_changed(&change),
        Command::Refresh => selector.refresh(),
        Command::Expand(item) => {
            selector.expand(item);
        }
        Command::Trigger(item) => {
            selector.trigger(item);
        }
        Command::Snapshot { respond } => {
            publish(selector, events);
            let snapshot = MenuSnapshot {
                available: selector.menu_available(),
                rows: selector.rows(),
            };
            respond.send(snapshot).ok();
        }
    }
}

/// Pump the selector and broadcast what changed.
fn publish(selector: &mut SourceSelector, events: &broadcast::Sender<ModelEvent>) {
    for event in selector.pump() {
        trace!(?event, "model event");
        // No subscribers is fine.
        events.send(event).ok();
    }
}
