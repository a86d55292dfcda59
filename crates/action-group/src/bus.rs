//! The action-group half of the bus client.

use appmenu_bus::{BusError, Endpoint, EventSink, NameWatcher, Subscription};
use appmenu_variant::WireValue;

/// One remote action as enumerated by the peer.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionDescription {
    /// Action name, unique within its group.
    pub name: String,
    /// Whether the action may currently be activated.
    pub enabled: bool,
    /// Declared parameter type string, if the action takes one.
    pub parameter_type: Option<String>,
    /// Current state, for stateful actions.
    pub state: Option<WireValue>,
}

impl ActionDescription {
    /// A stateless, enabled action without a parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            parameter_type: None,
            state: None,
        }
    }

    /// Set the declared parameter type.
    pub fn with_parameter(mut self, ty: impl Into<String>) -> Self {
        self.parameter_type = Some(ty.into());
        self
    }

    /// Set the initial state.
    pub fn with_state(mut self, state: WireValue) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Change notification emitted by a remote action group.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionSignal {
    /// An action was added (or re-announced).
    Added(ActionDescription),
    /// An action was removed.
    Removed(String),
    /// An action's state changed.
    StateChanged {
        /// Action name.
        name: String,
        /// New state.
        state: WireValue,
    },
    /// An action's enabled flag changed.
    EnabledChanged {
        /// Action name.
        name: String,
        /// New flag.
        enabled: bool,
    },
}

/// Bus operations on remote action groups.
///
/// Implementations may deliver signals on any thread; they only ever push
/// into the supplied sink.
pub trait ActionBus: NameWatcher {
    /// Enumerate every action exported at `endpoint`.
    fn describe_actions(&self, endpoint: &Endpoint) -> Result<Vec<ActionDescription>, BusError>;

    /// Subscribe to change signals from `endpoint` until the subscription is
    /// dropped.
    fn subscribe_actions(
        &self,
        endpoint: &Endpoint,
        sink: EventSink<ActionSignal>,
    ) -> Result<Subscription, BusError>;

    /// Ask the peer to activate `name`. Fire-and-forget.
    fn activate_action(
        &self,
        endpoint: &Endpoint,
        name: &str,
        parameter: Option<WireValue>,
    ) -> Result<(), BusError>;

    /// Ask the peer to change the state of `name`. Fire-and-forget.
    fn change_action_state(
        &self,
        endpoint: &Endpoint,
        name: &str,
        state: WireValue,
    ) -> Result<(), BusError>;
}
