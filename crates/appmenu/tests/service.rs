//! The menu service running on a tokio task.

use std::{sync::Arc, time::Duration};

use action_group::testing::FakeActionBus;
use appmenu::{
    AppMenuHandle, AppMenuService, Backends, ItemId, MenuId, MenuItem, ModelEvent, SourceSelector,
    WindowInfo,
    testing::{FakeMenuImporter, FakeWindowMetadata},
};
use appmenu_bus::{BusName, Endpoint, NameOwnerChanged, WindowId};
use appmenu_config::Config;
use tokio::{sync::broadcast, time::timeout};

fn menubar() -> Endpoint {
    Endpoint::new("org.kde.kate", "/MenuBar")
}

fn start() -> (AppMenuHandle, FakeMenuImporter, WindowId) {
    let importer = FakeMenuImporter::new();
    importer.set_menu(
        &menubar(),
        MenuId::ROOT,
        vec![
            MenuItem::new(ItemId(1), "File").with_submenu(MenuId(1)),
            MenuItem::new(ItemId(2), "Help"),
        ],
    );
    let windows = FakeWindowMetadata::new();
    let window = WindowId::new(0x400001);
    windows.add_window(window, WindowInfo::default());
    windows.set_property(window, "_KDE_NET_WM_APPMENU_SERVICE_NAME", "org.kde.kate");
    windows.set_property(window, "_KDE_NET_WM_APPMENU_OBJECT_PATH", "/MenuBar");

    let backends = Backends::new(Arc::new(importer.clone()), Arc::new(FakeActionBus::new()));
    let selector = SourceSelector::new(&Config::default(), backends, Arc::new(windows));
    (AppMenuService::spawn(selector), importer, window)
}

async fn next_event(rx: &mut broadcast::Receiver<ModelEvent>) -> ModelEvent {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("model event within timeout")
        .expect("event stream open")
}

async fn wait_for(rx: &mut broadcast::Receiver<ModelEvent>, wanted: &ModelEvent) {
    loop {
        if next_event(rx).await == *wanted {
            return;
        }
    }
}

#[tokio::test(flavor = "current_thread")]
async fn focus_populates_snapshot_and_events() {
    let (handle, _importer, window) = start();
    let mut rx = handle.subscribe();
    assert_eq!(handle.snapshot().await.rows.len(), 0);

    handle.active_window_changed(window);
    let snap = handle.snapshot().await;
    assert!(snap.available);
    let texts: Vec<_> = snap.rows.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["File", "Help"]);
    assert_eq!(snap.rows[0].id, ItemId(1));

    assert_eq!(next_event(&mut rx).await, ModelEvent::MenuAvailableChanged(true));
    assert_eq!(next_event(&mut rx).await, ModelEvent::RowsChanged);
}

#[tokio::test(flavor = "current_thread")]
async fn lost_owner_clears_model() {
    let (handle, importer, window) = start();
    let mut rx = handle.subscribe();
    handle.active_window_changed(window);
    assert!(handle.snapshot().await.available);

    handle.name_owner_changed(NameOwnerChanged {
        name: BusName::from("org.kde.kate"),
        old_owner: ":1.5".into(),
        new_owner: String::new(),
    });
    wait_for(&mut rx, &ModelEvent::Reset).await;
    assert_eq!(handle.snapshot().await, Default::default());
    assert_eq!(importer.open_count(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn bus_notifications_wake_the_service() {
    let (handle, importer, window) = start();
    importer.set_hold_replies(true);
    let mut rx = handle.subscribe();
    handle.active_window_changed(window);
    assert!(!handle.snapshot().await.available);

    assert_eq!(importer.notify_updated(&menubar(), MenuId::ROOT), 1);
    wait_for(&mut rx, &ModelEvent::MenuAvailableChanged(true)).await;
    assert!(handle.snapshot().await.available);
}

#[tokio::test(flavor = "current_thread")]
async fn expand_and_trigger_reach_the_importer() {
    let (handle, importer, window) = start();
    let mut rx = handle.subscribe();
    handle.active_window_changed(window);
    handle.snapshot().await;
    importer.clear_calls();

    handle.expand(ItemId(1));
    handle.trigger(ItemId(2));
    wait_for(&mut rx, &ModelEvent::SubmenuUpdated(MenuId(1))).await;
    handle.snapshot().await;
    assert_eq!(
        importer.calls(),
        vec![
            "update org.kde.kate/MenuBar 1".to_string(),
            "trigger org.kde.kate/MenuBar 2".to_string(),
        ]
    );
}
