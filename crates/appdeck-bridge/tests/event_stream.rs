// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end lifecycle: call channel and push channel against an in-memory device.

use std::sync::Arc;

use appdeck_bridge::memory::{DevicePackage, MemoryDevice};
use appdeck_bridge::{LauncherBridge, MethodCall};
use appdeck_core::{BridgeConfig, Drawable, PackageEvent};
use tokio::sync::mpsc;

fn device() -> Arc<MemoryDevice> {
    let device = Arc::new(MemoryDevice::new());
    device.install(
        DevicePackage::new("com.tv.player", "Player")
            .with_leanback()
            .with_banner(Drawable::solid(320, 180, [20, 20, 20, 255])),
    );
    device.install(DevicePackage::new("com.phone.notes", "Notes").with_launcher());
    device
}

fn drain(rx: &mut mpsc::UnboundedReceiver<PackageEvent>) -> Vec<PackageEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn install_update_remove_flow() {
    let device = device();
    let mut bridge = LauncherBridge::new(device.clone(), BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    bridge.listen(Arc::new(tx)).expect("listen");

    device.install(DevicePackage::new("com.tv.news", "News").with_leanback());
    device.install(
        DevicePackage::new("com.tv.news", "News")
            .with_leanback()
            .with_version(Some("2.0")),
    );
    device.uninstall("com.tv.news", false);

    let actions: Vec<_> = drain(&mut rx).iter().map(PackageEvent::action).collect();
    assert_eq!(actions, ["PACKAGE_ADDED", "PACKAGE_CHANGED", "PACKAGE_REMOVED"]);
}

#[test]
fn changed_event_carries_fresh_record() {
    let device = device();
    let mut bridge = LauncherBridge::new(device.clone(), BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    bridge.listen(Arc::new(tx)).expect("listen");

    device.install(
        DevicePackage::new("com.phone.notes", "Notes")
            .with_launcher()
            .with_version(Some("9.9")),
    );
    match drain(&mut rx).pop().expect("event") {
        PackageEvent::PackageChanged { app } => {
            assert_eq!(app.version.as_deref(), Some("9.9"));
            assert!(app.sideloaded);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn cancelled_subscription_receives_nothing_more() {
    let device = device();
    let mut bridge = LauncherBridge::new(device.clone(), BridgeConfig::default());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let a = bridge.listen(Arc::new(tx_a)).expect("listen a");
    bridge.listen(Arc::new(tx_b)).expect("listen b");

    assert!(bridge.cancel(a));
    assert!(!bridge.cancel(a));
    device.uninstall("com.tv.player", false);

    assert!(drain(&mut rx_a).is_empty());
    assert_eq!(drain(&mut rx_b).len(), 1);
}

#[test]
fn dropping_bridge_unregisters_every_listener() {
    let device = device();
    {
        let mut bridge = LauncherBridge::new(device.clone(), BridgeConfig::default());
        for _ in 0..3 {
            let (tx, _rx) = mpsc::unbounded_channel();
            bridge.listen(Arc::new(tx)).expect("listen");
        }
        assert_eq!(device.registered_callbacks(), 3);
    }
    assert_eq!(device.unregister_calls(), 3);
    assert_eq!(device.registered_callbacks(), 0);
}

#[test]
fn uninstall_keeps_existence_until_purged() {
    let device = device();
    let bridge = LauncherBridge::new(device.clone(), BridgeConfig::default());
    let exists = |pkg: &str| {
        bridge
            .handle(&MethodCall::with_package("applicationExists", pkg))
            .expect("call")
            .as_flag()
    };

    assert_eq!(exists("com.phone.notes"), Some(true));
    device.uninstall("com.phone.notes", true);
    assert_eq!(exists("com.phone.notes"), Some(true));
    device.uninstall("com.tv.player", false);
    assert_eq!(exists("com.tv.player"), Some(false));
}

#[test]
fn enumeration_serializes_to_ui_contract() {
    let device = device();
    let bridge = LauncherBridge::new(device, BridgeConfig::default());
    let response = bridge
        .handle(&MethodCall::bare("getApplications"))
        .expect("call");
    let json = serde_json::to_value(&response).expect("json");

    let apps = json.as_array().expect("array");
    assert_eq!(apps.len(), 2);
    assert_eq!(apps[0]["packageName"], "com.tv.player");
    assert_eq!(apps[0]["sideloaded"], false);
    assert!(apps[0]["banner"].is_array());
    assert_eq!(apps[1]["packageName"], "com.phone.notes");
    assert_eq!(apps[1]["sideloaded"], true);
    assert!(apps[1]["icon"].is_null());
}
