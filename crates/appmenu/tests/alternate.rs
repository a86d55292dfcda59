//! Alternate-protocol adaptor: menu import plus action group routing.

use std::sync::Arc;

use action_group::{ActionDescription, ActionEvent, ProxyStatus, testing::FakeActionBus};
use appmenu::{
    AdaptorEvent, AlternateAdaptor, Backends, EndpointSet, ItemId, MenuId, MenuItem, MenuRole,
    MenuSource, testing::FakeMenuImporter,
};
use appmenu_bus::{BusName, Endpoint, ObjectPath};
use appmenu_variant::{Value, WireValue};

const BUS: &str = ":1.42";

struct Rig {
    importer: FakeMenuImporter,
    bus: FakeActionBus,
    adaptor: AlternateAdaptor,
}

fn endpoints() -> EndpointSet {
    EndpointSet::new()
        .with(MenuRole::AppMenu, "/org/gtk/menus/appmenu")
        .with(MenuRole::MenuBar, "/org/gtk/menus/menubar")
        .with(MenuRole::Application, "/org/gtk/app")
        .with(MenuRole::Window, "/org/gtk/app/window/1")
        .with(MenuRole::Unity, "")
}

fn rig() -> Rig {
    let importer = FakeMenuImporter::new();
    let bus = FakeActionBus::new();
    importer.set_menu(
        &Endpoint::new(BUS, "/org/gtk/menus/menubar"),
        MenuId::ROOT,
        vec![
            MenuItem::new(ItemId(1), "Quit").with_action("app.quit", None),
            MenuItem::new(ItemId(2), "Zoom").with_action("win.zoom", Some(Value::Int32(2))),
            MenuItem::new(ItemId(3), "Launcher").with_action("unity.launch", None),
            MenuItem::new(ItemId(4), "Broken").with_action("quit", None),
            MenuItem::new(ItemId(5), "Label"),
        ],
    );
    bus.set_actions(
        &Endpoint::new(BUS, "/org/gtk/app"),
        vec![ActionDescription::new("quit")],
    );
    bus.set_actions(
        &Endpoint::new(BUS, "/org/gtk/app/window/1"),
        vec![
            ActionDescription::new("zoom").with_parameter("u"),
            ActionDescription::new("fullscreen").with_state(WireValue::Bool(false)),
        ],
    );
    bus.set_owner(&BusName::from(BUS), BUS);
    let backends = Backends::new(Arc::new(importer.clone()), Arc::new(bus.clone()));
    Rig {
        importer,
        bus,
        adaptor: AlternateAdaptor::new(backends),
    }
}

impl Rig {
    fn pump(&mut self) -> Vec<AdaptorEvent> {
        let mut all = Vec::new();
        loop {
            let events = self.adaptor.pump();
            if events.is_empty() {
                return all;
            }
            all.extend(events);
        }
    }
}

fn appeared(role: MenuRole, name: &str) -> AdaptorEvent {
    AdaptorEvent::Action {
        role,
        event: ActionEvent::Appeared(name.into()),
    }
}

#[test]
fn activation_imports_menu_and_starts_groups() {
    let mut rig = rig();
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());

    let request = rig.importer.last_request().unwrap();
    assert_eq!(request.menu_path, ObjectPath::from("/org/gtk/menus/menubar"));
    assert_eq!(
        request.app_menu_path,
        Some(ObjectPath::from("/org/gtk/menus/appmenu"))
    );
    assert_eq!(rig.bus.watch_count(&BusName::from(BUS)), 2);
    assert!(rig.adaptor.proxy(MenuRole::Unity).is_none());

    let events = rig.pump();
    assert!(events.contains(&AdaptorEvent::MenuAvailableChanged(true)));
    assert!(events.contains(&AdaptorEvent::MenuUpdated));
    assert!(events.contains(&appeared(MenuRole::Application, "quit")));
    assert!(events.contains(&appeared(MenuRole::Window, "zoom")));
    assert!(events.contains(&appeared(MenuRole::Window, "fullscreen")));

    let window = rig.adaptor.proxy(MenuRole::Window).unwrap();
    assert_eq!(window.status(), ProxyStatus::Connected);
    assert_eq!(window.get_action_state("fullscreen"), Some(Value::Bool(false)));
    assert_eq!(rig.adaptor.root_items().len(), 5);
}

#[test]
fn trigger_routes_by_namespace() {
    let mut rig = rig();
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());
    rig.pump();

    assert!(rig.adaptor.trigger(ItemId(1)));
    assert!(rig.bus.calls_contains(":1.42/org/gtk/app quit"));
    assert_eq!(rig.bus.last_activation(), Some(("quit".to_string(), None)));

    assert!(rig.adaptor.trigger(ItemId(2)));
    assert_eq!(
        rig.bus.last_activation(),
        Some(("zoom".to_string(), Some(WireValue::UInt32(2))))
    );

    rig.bus.clear_calls();
    assert!(!rig.adaptor.trigger(ItemId(3)));
    assert!(!rig.adaptor.trigger(ItemId(4)));
    assert!(!rig.adaptor.trigger(ItemId(5)));
    assert!(!rig.adaptor.trigger(ItemId(404)));
    assert!(!rig.bus.calls_contains("activate"));
    assert!(!rig.importer.calls_contains("trigger"));
}

#[test]
fn reactivation_with_same_pair_keeps_subscriptions() {
    let mut rig = rig();
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());
    rig.pump();
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());
    let events = rig.pump();

    assert_eq!(rig.importer.opened(), 1);
    assert_eq!(rig.bus.watch_count(&BusName::from(BUS)), 2);
    assert_eq!(events, vec![AdaptorEvent::MenuUpdated]);
}

#[test]
fn new_pair_tears_everything_down() {
    let mut rig = rig();
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());
    rig.pump();

    let other = EndpointSet::new().with(MenuRole::MenuBar, "/other");
    rig.adaptor.activate(&BusName::from(":1.99"), &other);
    assert_eq!(rig.importer.open_count(), 0);
    assert_eq!(rig.bus.watch_count(&BusName::from(BUS)), 0);
    assert_eq!(
        rig.bus
            .subscription_count(&Endpoint::new(BUS, "/org/gtk/app/window/1")),
        0
    );

    let events = rig.pump();
    assert_eq!(events[0], AdaptorEvent::MenuAvailableChanged(false));
    let vanished: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            AdaptorEvent::Action {
                role,
                event: ActionEvent::Vanished(name),
            } => Some((*role, name.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        vanished,
        vec![
            (MenuRole::Application, "quit"),
            (MenuRole::Window, "fullscreen"),
            (MenuRole::Window, "zoom"),
        ]
    );
    assert!(!rig.adaptor.menu_available());
    assert_eq!(rig.adaptor.bus_name(), Some(&BusName::from(":1.99")));
}

#[test]
fn deactivate_reports_every_cached_action() {
    let mut rig = rig();
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());
    rig.pump();

    rig.adaptor.deactivate();
    assert_eq!(rig.adaptor.bus_name(), None);
    assert_eq!(rig.bus.watch_count(&BusName::from(BUS)), 0);
    assert!(rig.adaptor.proxy(MenuRole::Window).is_none());

    let events = rig.pump();
    assert_eq!(events[0], AdaptorEvent::MenuAvailableChanged(false));
    let vanished = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                AdaptorEvent::Action {
                    event: ActionEvent::Vanished(_),
                    ..
                }
            )
        })
        .count();
    assert_eq!(vanished, 3);
    assert!(rig.pump().is_empty());
}

#[test]
fn expand_requests_submenu() {
    let mut rig = rig();
    rig.importer.set_menu(
        &Endpoint::new(BUS, "/org/gtk/menus/menubar"),
        MenuId::ROOT,
        vec![MenuItem::new(ItemId(1), "File").with_submenu(MenuId(7))],
    );
    rig.adaptor.activate(&BusName::from(BUS), &endpoints());
    let events = rig.pump();
    assert!(events.contains(&AdaptorEvent::SubmenuUpdated(MenuId(7))));

    rig.importer.clear_calls();
    assert!(rig.adaptor.expand(ItemId(1)));
    assert_eq!(
        rig.importer.calls(),
        vec![format!("update {BUS}/org/gtk/menus/menubar 7")]
    );
    assert_eq!(
        rig.adaptor.pump(),
        vec![AdaptorEvent::SubmenuUpdated(MenuId(7))]
    );
}
