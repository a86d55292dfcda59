//! Local mirror of one remote action group.

use std::{collections::BTreeMap, fmt, mem, sync::Arc};

use appmenu_bus::{Endpoint, EventQueue, NameEvent, Subscription, Waker};
use appmenu_variant::{Value, WireValue, decode, encode, encode_with_schema};
use tracing::{debug, trace, warn};

use crate::{ActionBus, ActionDescription, ActionSignal};

/// Connection state of a proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyStatus {
    /// No owner for the endpoint's bus name, or not started.
    Disconnected,
    /// Owner seen; subscribing and enumerating.
    Connecting,
    /// Cache populated and tracking signals.
    Connected,
}

/// Cached view of a remote action.
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteAction {
    /// Action name.
    pub name: String,
    /// Whether the action may be activated.
    pub enabled: bool,
    /// Declared parameter type string.
    pub parameter_type: Option<String>,
    /// Current state, decoded.
    pub state: Option<Value>,
    /// Wire type string of `state` as last received.
    pub state_type: Option<String>,
}

impl RemoteAction {
    /// Build a cache entry from an enumeration record.
    fn from_description(desc: ActionDescription) -> Self {
        let mut action = Self {
            name: desc.name,
            enabled: desc.enabled,
            parameter_type: desc.parameter_type,
            state: None,
            state_type: None,
        };
        if let Some(state) = desc.state {
            action.set_state(&state);
        }
        action
    }

    /// Replace the cached state.
    fn set_state(&mut self, state: &WireValue) {
        self.state = Some(decode(state));
        self.state_type = Some(state.wire_type().to_string());
    }
}

/// Change notification for consumers of a proxy.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionEvent {
    /// The action became known.
    Appeared(String),
    /// The action's state changed.
    StateChanged {
        /// Action name.
        name: String,
        /// New state.
        state: Value,
    },
    /// The action's enabled flag changed.
    EnabledChanged {
        /// Action name.
        name: String,
        /// New flag.
        enabled: bool,
    },
    /// The action is gone.
    Vanished(String),
}

/// A live connection to one owner of the endpoint.
struct Connection {
    /// Unique name of the owner we connected to.
    owner: String,
    /// Signals for this connection only; dropped with it.
    signals: EventQueue<ActionSignal>,
    /// Keeps the remote signal subscription alive.
    _subscription: Subscription,
    /// Cached actions keyed by name.
    actions: BTreeMap<String, RemoteAction>,
}

/// Internal connection state.
enum State {
    /// See [`ProxyStatus::Disconnected`].
    Disconnected,
    /// See [`ProxyStatus::Connecting`].
    Connecting,
    /// See [`ProxyStatus::Connected`].
    Connected(Connection),
}

/// Mirror of a remote action group at one endpoint.
///
/// All mutation happens on the owner's context: bus notifications are queued
/// and applied by [`ActionGroupProxy::pump`], which returns the resulting
/// [`ActionEvent`]s in order. Every name that is reported `StateChanged`,
/// `EnabledChanged` or `Vanished` has been reported `Appeared` first.
pub struct ActionGroupProxy {
    /// Bus client.
    bus: Arc<dyn ActionBus>,
    /// Remote object this proxy mirrors.
    endpoint: Endpoint,
    /// Waker shared by every queue this proxy creates.
    waker: Waker,
    /// Name-presence notifications for the endpoint's bus name.
    names: EventQueue<NameEvent>,
    /// Name watch, present between `start` and `stop`.
    watch: Option<Subscription>,
    /// Connection state.
    state: State,
    /// Events produced since the last pump.
    events: Vec<ActionEvent>,
}

impl ActionGroupProxy {
    /// Create a disconnected proxy. Queues created by the proxy signal `waker`.
    pub fn new(bus: Arc<dyn ActionBus>, endpoint: Endpoint, waker: Waker) -> Self {
        Self {
            bus,
            endpoint,
            names: EventQueue::new(waker.clone()),
            waker,
            watch: None,
            state: State::Disconnected,
            events: Vec::new(),
        }
    }

    /// Start watching the endpoint's bus name. Connection follows once the
    /// name has an owner.
    pub fn start(&mut self) {
        if self.watch.is_some() {
            return;
        }
        match self
            .bus
            .watch_name(&self.endpoint.bus_name, self.names.sink())
        {
            Ok(sub) => {
                debug!(endpoint = %self.endpoint, "watching action group");
                self.watch = Some(sub);
            }
            Err(e) => warn!(endpoint = %self.endpoint, error = %e, "cannot watch bus name"),
        }
    }

    /// Stop watching and disconnect.
    pub fn stop(&mut self) {
        self.watch = None;
        let stale = self.names.drain();
        trace!(endpoint = %self.endpoint, dropped = stale.len(), "stopped");
        self.on_endpoint_vanished();
    }

    /// The endpoint gained an owner: subscribe, then enumerate.
    pub fn on_endpoint_appeared(&mut self, owner: &str) {
        if let State::Connected(conn) = &self.state
            && conn.owner == owner
        {
            trace!(endpoint = %self.endpoint, owner, "owner unchanged");
            return;
        }
        self.on_endpoint_vanished();
        self.state = State::Connecting;
        trace!(endpoint = %self.endpoint, owner, "connecting");

        let signals = EventQueue::new(self.waker.clone());
        let subscription = match self.bus.subscribe_actions(&self.endpoint, signals.sink()) {
            Ok(sub) => sub,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "cannot subscribe to action signals");
                self.state = State::Disconnected;
                return;
            }
        };
        let descriptions = match self.bus.describe_actions(&self.endpoint) {
            Ok(d) => d,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "cannot enumerate actions");
                self.state = State::Disconnected;
                return;
            }
        };

        let mut actions = BTreeMap::new();
        for desc in descriptions {
            let action = RemoteAction::from_description(desc);
            if actions.contains_key(&action.name) {
                continue;
            }
            self.events.push(ActionEvent::Appeared(action.name.clone()));
            actions.insert(action.name.clone(), action);
        }
        debug!(endpoint = %self.endpoint, owner, count = actions.len(), "connected");
        self.state = State::Connected(Connection {
            owner: owner.to_string(),
            signals,
            _subscription: subscription,
            actions,
        });
    }

    /// The endpoint lost its owner: every cached action vanishes once.
    pub fn on_endpoint_vanished(&mut self) {
        match mem::replace(&mut self.state, State::Disconnected) {
            State::Connected(conn) => {
                debug!(endpoint = %self.endpoint, count = conn.actions.len(), "disconnected");
                self.events
                    .extend(conn.actions.into_keys().map(ActionEvent::Vanished));
            }
            State::Connecting | State::Disconnected => {}
        }
    }

    /// Apply queued notifications and return the resulting events.
    pub fn pump(&mut self) -> Vec<ActionEvent> {
        let signals = match &self.state {
            State::Connected(conn) => conn.signals.drain(),
            State::Connecting | State::Disconnected => Vec::new(),
        };
        for signal in signals {
            self.apply(signal);
        }
        for event in self.names.drain() {
            match event {
                NameEvent::Appeared { owner } => self.on_endpoint_appeared(&owner),
                NameEvent::Vanished => self.on_endpoint_vanished(),
            }
        }
        mem::take(&mut self.events)
    }

    /// Apply one change signal to the cache.
    fn apply(&mut self, signal: ActionSignal) {
        let State::Connected(conn) = &mut self.state else {
            return;
        };
        match signal {
            ActionSignal::Added(desc) => match conn.actions.get_mut(&desc.name) {
                Some(existing) => {
                    trace!(name = %desc.name, "action re-announced");
                    if existing.enabled != desc.enabled {
                        existing.enabled = desc.enabled;
                        self.events.push(ActionEvent::EnabledChanged {
                            name: desc.name.clone(),
                            enabled: desc.enabled,
                        });
                    }
                    existing.parameter_type = desc.parameter_type;
                    if let Some(state) = desc.state {
                        let value = decode(&state);
                        if existing.state.as_ref() != Some(&value) {
                            existing.set_state(&state);
                            self.events.push(ActionEvent::StateChanged {
                                name: desc.name,
                                state: value,
                            });
                        }
                    }
                }
                None => {
                    let action = RemoteAction::from_description(desc);
                    self.events.push(ActionEvent::Appeared(action.name.clone()));
                    conn.actions.insert(action.name.clone(), action);
                }
            },
            ActionSignal::Removed(name) => {
                if conn.actions.remove(&name).is_some() {
                    self.events.push(ActionEvent::Vanished(name));
                } else {
                    trace!(name, "removal of unknown action");
                }
            }
            ActionSignal::StateChanged { name, state } => match conn.actions.get_mut(&name) {
                Some(action) => {
                    action.set_state(&state);
                    let value = decode(&state);
                    self.events.push(ActionEvent::StateChanged { name, state: value });
                }
                None => trace!(name, "state change for unknown action"),
            },
            ActionSignal::EnabledChanged { name, enabled } => match conn.actions.get_mut(&name) {
                Some(action) => {
                    action.enabled = enabled;
                    self.events.push(ActionEvent::EnabledChanged { name, enabled });
                }
                None => trace!(name, "enabled change for unknown action"),
            },
        }
    }

    /// Cache, when connected.
    fn actions(&self) -> Option<&BTreeMap<String, RemoteAction>> {
        match &self.state {
            State::Connected(conn) => Some(&conn.actions),
            State::Connecting | State::Disconnected => None,
        }
    }

    /// Names of every cached action; empty when disconnected.
    pub fn list_action_names(&self) -> Vec<String> {
        self.actions()
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// True when `name` is cached.
    pub fn has_action(&self, name: &str) -> bool {
        self.action(name).is_some()
    }

    /// Cached state of `name`.
    pub fn get_action_state(&self, name: &str) -> Option<Value> {
        self.action(name).and_then(|a| a.state.clone())
    }

    /// Cached enabled flag; `false` for unknown actions.
    pub fn is_action_enabled(&self, name: &str) -> bool {
        self.action(name).is_some_and(|a| a.enabled)
    }

    /// Full cache entry for `name`.
    pub fn action(&self, name: &str) -> Option<&RemoteAction> {
        self.actions()?.get(name)
    }

    /// Current connection state.
    pub fn status(&self) -> ProxyStatus {
        match self.state {
            State::Disconnected => ProxyStatus::Disconnected,
            State::Connecting => ProxyStatus::Connecting,
            State::Connected(_) => ProxyStatus::Connected,
        }
    }

    /// Endpoint this proxy mirrors.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Ask the remote side to activate `name`, encoding `parameter` against
    /// the action's declared parameter type.
    pub fn activate_action(&self, name: &str, parameter: Option<&Value>) {
        let Some(action) = self.action(name) else {
            debug!(endpoint = %self.endpoint, name, "activate: unknown action or disconnected");
            return;
        };
        let wire = match (parameter, action.parameter_type.as_deref()) {
            (None, _) => None,
            (Some(value), Some(schema)) => encode_with_schema(value, schema),
            (Some(value), None) => encode(value),
        };
        if parameter.is_some() && wire.is_none() {
            warn!(endpoint = %self.endpoint, name, "activate: parameter cannot be encoded");
            return;
        }
        trace!(endpoint = %self.endpoint, name, "activate");
        if let Err(e) = self.bus.activate_action(&self.endpoint, name, wire) {
            warn!(endpoint = %self.endpoint, name, error = %e, "activate failed");
        }
    }

    /// Ask the remote side to change the state of `name`, encoding `value`
    /// against the wire type of the cached state.
    pub fn change_action_state(&self, name: &str, value: &Value) {
        let Some(action) = self.action(name) else {
            debug!(endpoint = %self.endpoint, name, "change state: unknown action or disconnected");
            return;
        };
        let wire = match action.state_type.as_deref() {
            Some(schema) => encode_with_schema(value, schema),
            None => encode(value),
        };
        let Some(wire) = wire else {
            warn!(endpoint = %self.endpoint, name, "change state: value cannot be encoded");
            return;
        };
        trace!(endpoint = %self.endpoint, name, "change state");
        if let Err(e) = self.bus.change_action_state(&self.endpoint, name, wire) {
            warn!(endpoint = %self.endpoint, name, error = %e, "change state failed");
        }
    }
}

impl fmt::Debug for ActionGroupProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroupProxy")
            .field("endpoint", &self.endpoint)
            .field("status", &self.status())
            .field("actions", &self.list_action_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use appmenu_bus::BusName;

    use super::*;
    use crate::testing::FakeActionBus;

    fn setup() -> (Arc<FakeActionBus>, ActionGroupProxy) {
        let bus = Arc::new(FakeActionBus::new());
        let endpoint = Endpoint::new("org.example.App", "/org/example/App");
        let proxy = ActionGroupProxy::new(bus.clone(), endpoint, Waker::new());
        (bus, proxy)
    }

    #[test]
    fn appear_enumerates_cache() {
        let (bus, mut proxy) = setup();
        bus.set_actions(
            proxy.endpoint(),
            vec![
                ActionDescription::new("quit"),
                ActionDescription::new("zoom").with_state(WireValue::Bool(false)),
            ],
        );
        proxy.on_endpoint_appeared(":1.5");
        assert_eq!(proxy.status(), ProxyStatus::Connected);
        assert_eq!(
            proxy.pump(),
            vec![
                ActionEvent::Appeared("quit".into()),
                ActionEvent::Appeared("zoom".into())
            ]
        );
        assert_eq!(proxy.get_action_state("zoom"), Some(Value::Bool(false)));
        assert_eq!(proxy.action("zoom").unwrap().state_type.as_deref(), Some("b"));
        assert!(proxy.is_action_enabled("quit"));
        assert!(!proxy.is_action_enabled("missing"));
        assert!(bus.calls_contains("subscribe org.example.App/org/example/App"));
    }

    #[test]
    fn subscribes_before_describing() {
        let (bus, mut proxy) = setup();
        proxy.on_endpoint_appeared(":1.5");
        let calls = bus.calls();
        let sub = calls.iter().position(|c| c.starts_with("subscribe"));
        let describe = calls.iter().position(|c| c.starts_with("describe"));
        assert!(sub.unwrap() < describe.unwrap());
    }

    #[test]
    fn enumeration_failure_stays_disconnected() {
        let (bus, mut proxy) = setup();
        bus.set_fail_describe(true);
        proxy.on_endpoint_appeared(":1.5");
        assert_eq!(proxy.status(), ProxyStatus::Disconnected);
        assert_eq!(bus.subscription_count(proxy.endpoint()), 0);
        assert!(proxy.pump().is_empty());
    }

    #[test]
    fn duplicate_added_updates_instead_of_reappearing() {
        let (bus, mut proxy) = setup();
        bus.set_actions(proxy.endpoint(), vec![ActionDescription::new("bold")]);
        proxy.on_endpoint_appeared(":1.5");
        proxy.pump();
        bus.emit(
            proxy.endpoint(),
            ActionSignal::Added(
                ActionDescription::new("bold")
                    .with_enabled(false)
                    .with_state(WireValue::Bool(true)),
            ),
        );
        assert_eq!(
            proxy.pump(),
            vec![
                ActionEvent::EnabledChanged {
                    name: "bold".into(),
                    enabled: false
                },
                ActionEvent::StateChanged {
                    name: "bold".into(),
                    state: Value::Bool(true)
                },
            ]
        );
    }

    #[test]
    fn signals_for_unknown_actions_are_ignored() {
        let (bus, mut proxy) = setup();
        proxy.on_endpoint_appeared(":1.5");
        proxy.pump();
        bus.emit(
            proxy.endpoint(),
            ActionSignal::StateChanged {
                name: "ghost".into(),
                state: WireValue::Int32(1),
            },
        );
        bus.emit(proxy.endpoint(), ActionSignal::Removed("ghost".into()));
        assert!(proxy.pump().is_empty());
    }

    #[test]
    fn vanish_emits_once_per_action() {
        let (bus, mut proxy) = setup();
        bus.set_actions(proxy.endpoint(), vec![ActionDescription::new("quit")]);
        proxy.on_endpoint_appeared(":1.5");
        proxy.pump();
        proxy.on_endpoint_vanished();
        proxy.on_endpoint_vanished();
        assert_eq!(proxy.pump(), vec![ActionEvent::Vanished("quit".into())]);
        assert_eq!(proxy.get_action_state("quit"), None);
        assert!(proxy.list_action_names().is_empty());
        assert_eq!(bus.subscription_count(proxy.endpoint()), 0);
    }

    #[test]
    fn activation_uses_declared_parameter_type() {
        let (bus, mut proxy) = setup();
        bus.set_actions(
            proxy.endpoint(),
            vec![ActionDescription::new("goto").with_parameter("u")],
        );
        proxy.on_endpoint_appeared(":1.5");
        proxy.activate_action("goto", Some(&Value::Int32(4)));
        assert_eq!(
            bus.last_activation(),
            Some(("goto".to_string(), Some(WireValue::UInt32(4))))
        );
    }

    #[test]
    fn state_change_uses_cached_state_type() {
        let (bus, mut proxy) = setup();
        bus.set_actions(
            proxy.endpoint(),
            vec![ActionDescription::new("size").with_state(WireValue::Int64(10))],
        );
        proxy.on_endpoint_appeared(":1.5");
        proxy.change_action_state("size", &Value::Int32(12));
        assert_eq!(
            bus.last_state_change(),
            Some(("size".to_string(), WireValue::Int64(12)))
        );
    }

    #[test]
    fn mutations_while_disconnected_are_noops() {
        let (bus, proxy) = setup();
        proxy.activate_action("quit", None);
        proxy.change_action_state("quit", &Value::Bool(true));
        assert!(bus.calls().is_empty());
    }

    #[test]
    fn start_follows_name_owner() {
        let (bus, mut proxy) = setup();
        bus.set_actions(proxy.endpoint(), vec![ActionDescription::new("quit")]);
        bus.set_owner(&BusName::new("org.example.App"), ":1.9");
        proxy.start();
        assert_eq!(proxy.pump(), vec![ActionEvent::Appeared("quit".into())]);
        bus.drop_owner(&BusName::new("org.example.App"));
        assert_eq!(proxy.pump(), vec![ActionEvent::Vanished("quit".into())]);
        proxy.stop();
        assert_eq!(bus.watch_count(&BusName::new("org.example.App")), 0);
    }
}
