//! In-memory [`ActionBus`] for tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use appmenu_bus::{BusError, BusName, Endpoint, EventSink, NameEvent, NameWatcher, Subscription};
use appmenu_variant::WireValue;
use parking_lot::Mutex;

use crate::{ActionBus, ActionDescription, ActionSignal};

/// Shared state behind the fake.
#[derive(Default)]
struct Inner {
    /// Current owner per bus name.
    owners: HashMap<BusName, String>,
    /// Actions exported per endpoint.
    actions: HashMap<Endpoint, Vec<ActionDescription>>,
    /// Live name watches.
    watches: Vec<(u64, BusName, EventSink<NameEvent>)>,
    /// Live signal subscriptions.
    subscriptions: Vec<(u64, Endpoint, EventSink<ActionSignal>)>,
    /// Next registration id.
    next_id: u64,
    /// Human-readable call log.
    calls: Vec<String>,
    /// Last `activate_action` call.
    last_activation: Option<(String, Option<WireValue>)>,
    /// Last `change_action_state` call.
    last_state_change: Option<(String, WireValue)>,
}

/// Scriptable bus: owners, exported actions and signals are set by the test,
/// and every call is recorded.
#[derive(Clone, Default)]
pub struct FakeActionBus {
    /// Shared state; subscriptions hold a clone to unregister on drop.
    inner: Arc<Mutex<Inner>>,
    /// Make `describe_actions` fail.
    fail_describe: Arc<AtomicBool>,
    /// Make `subscribe_actions` fail.
    fail_subscribe: Arc<AtomicBool>,
}

impl FakeActionBus {
    /// An empty bus with no owned names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the actions exported at `endpoint`.
    pub fn set_actions(&self, endpoint: &Endpoint, actions: Vec<ActionDescription>) {
        self.inner.lock().actions.insert(endpoint.clone(), actions);
    }

    /// Give `name` an owner and notify watchers.
    pub fn set_owner(&self, name: &BusName, owner: &str) {
        let mut g = self.inner.lock();
        g.owners.insert(name.clone(), owner.to_string());
        for (_, watched, sink) in &g.watches {
            if watched == name {
                sink.send(NameEvent::Appeared {
                    owner: owner.to_string(),
                });
            }
        }
    }

    /// Release `name` and notify watchers.
    pub fn drop_owner(&self, name: &BusName) {
        let mut g = self.inner.lock();
        g.owners.remove(name);
        for (_, watched, sink) in &g.watches {
            if watched == name {
                sink.send(NameEvent::Vanished);
            }
        }
    }

    /// Deliver `signal` to every subscriber of `endpoint`; returns how many
    /// subscribers received it.
    pub fn emit(&self, endpoint: &Endpoint, signal: ActionSignal) -> usize {
        let g = self.inner.lock();
        g.subscriptions
            .iter()
            .filter(|(_, ep, _)| ep == endpoint)
            .filter(|(_, _, sink)| sink.send(signal.clone()))
            .count()
    }

    /// Live signal subscriptions for `endpoint`.
    pub fn subscription_count(&self, endpoint: &Endpoint) -> usize {
        self.inner
            .lock()
            .subscriptions
            .iter()
            .filter(|(_, ep, _)| ep == endpoint)
            .count()
    }

    /// Live name watches for `name`.
    pub fn watch_count(&self, name: &BusName) -> usize {
        self.inner
            .lock()
            .watches
            .iter()
            .filter(|(_, n, _)| n == name)
            .count()
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    /// True when a recorded call equals `s`.
    pub fn calls_contains(&self, s: &str) -> bool {
        self.inner.lock().calls.iter().any(|x| x == s)
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Name and parameter of the last activation.
    pub fn last_activation(&self) -> Option<(String, Option<WireValue>)> {
        self.inner.lock().last_activation.clone()
    }

    /// Name and value of the last state change request.
    pub fn last_state_change(&self) -> Option<(String, WireValue)> {
        self.inner.lock().last_state_change.clone()
    }

    /// Make enumeration fail.
    pub fn set_fail_describe(&self, v: bool) {
        self.fail_describe.store(v, Ordering::SeqCst);
    }

    /// Make signal subscription fail.
    pub fn set_fail_subscribe(&self, v: bool) {
        self.fail_subscribe.store(v, Ordering::SeqCst);
    }

    /// Append to the call log.
    fn note(&self, call: String) {
        self.inner.lock().calls.push(call);
    }

    /// Allocate a registration id.
    fn next_id(inner: &mut Inner) -> u64 {
        inner.next_id += 1;
        inner.next_id
    }
}

impl NameWatcher for FakeActionBus {
    fn watch_name(
        &self,
        name: &BusName,
        sink: EventSink<NameEvent>,
    ) -> Result<Subscription, BusError> {
        self.note(format!("watch {name}"));
        let mut g = self.inner.lock();
        let id = Self::next_id(&mut g);
        if let Some(owner) = g.owners.get(name) {
            sink.send(NameEvent::Appeared {
                owner: owner.clone(),
            });
        }
        g.watches.push((id, name.clone(), sink));
        let inner = self.inner.clone();
        Ok(Subscription::new(move || {
            inner.lock().watches.retain(|(i, _, _)| *i != id);
        }))
    }
}

impl ActionBus for FakeActionBus {
    fn describe_actions(&self, endpoint: &Endpoint) -> Result<Vec<ActionDescription>, BusError> {
        self.note(format!("describe {endpoint}"));
        if self.fail_describe.load(Ordering::SeqCst) {
            return Err(BusError::NoSuchObject(endpoint.clone()));
        }
        Ok(self
            .inner
            .lock()
            .actions
            .get(endpoint)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe_actions(
        &self,
        endpoint: &Endpoint,
        sink: EventSink<ActionSignal>,
    ) -> Result<Subscription, BusError> {
        self.note(format!("subscribe {endpoint}"));
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(BusError::Disconnected);
        }
        let mut g = self.inner.lock();
        let id = Self::next_id(&mut g);
        g.subscriptions.push((id, endpoint.clone(), sink));
        let inner = self.inner.clone();
        Ok(Subscription::new(move || {
            inner.lock().subscriptions.retain(|(i, _, _)| *i != id);
        }))
    }

    fn activate_action(
        &self,
        endpoint: &Endpoint,
        name: &str,
        parameter: Option<WireValue>,
    ) -> Result<(), BusError> {
        self.note(format!("activate {endpoint} {name}"));
        self.inner.lock().last_activation = Some((name.to_string(), parameter));
        Ok(())
    }

    fn change_action_state(
        &self,
        endpoint: &Endpoint,
        name: &str,
        state: WireValue,
    ) -> Result<(), BusError> {
        self.note(format!("change_state {endpoint} {name}"));
        self.inner.lock().last_state_change = Some((name.to_string(), state));
        Ok(())
    }
}
