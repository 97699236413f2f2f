// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Package-change listener that forwards platform notifications onto the
// push channel as `PackageEvent`s.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use appdeck_core::PackageEvent;
use tracing::debug;

use crate::inventory::AppInventory;
use crate::traits::{EventSink, PackageCallback};

/// One subscription's platform callback.
///
/// Events go out immediately, unbuffered. After [`deactivate`](Self::deactivate)
/// nothing is forwarded, even if the platform is still mid-dispatch.
pub struct ForwardingListener {
    inventory: AppInventory,
    sink: Arc<dyn EventSink>,
    active: AtomicBool,
}

impl ForwardingListener {
    pub fn new(inventory: AppInventory, sink: Arc<dyn EventSink>) -> Self {
        Self {
            inventory,
            sink,
            active: AtomicBool::new(true),
        }
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn forward(&self, event: PackageEvent) {
        if self.is_active() {
            debug!(action = event.action(), "Forwarding package event");
            self.sink.emit(event);
        }
    }
}

impl PackageCallback for ForwardingListener {
    fn on_package_removed(&self, package_name: &str) {
        self.forward(PackageEvent::PackageRemoved {
            package_name: package_name.into(),
        });
    }

    fn on_package_added(&self, package_name: &str) {
        if !self.is_active() {
            return;
        }
        match self.inventory.application_or_none(package_name) {
            Some(app) => self.forward(PackageEvent::PackageAdded { app }),
            None => debug!(package = package_name, "Added package not launchable, dropped"),
        }
    }

    fn on_package_changed(&self, package_name: &str) {
        if !self.is_active() {
            return;
        }
        match self.inventory.application_or_none(package_name) {
            Some(app) => self.forward(PackageEvent::PackageChanged { app }),
            None => debug!(package = package_name, "Changed package not launchable, dropped"),
        }
    }

    fn on_packages_available(&self, package_names: &[String], _replacing: bool) {
        if !self.is_active() || package_names.is_empty() {
            return;
        }
        let apps = package_names
            .iter()
            .map(|name| self.inventory.application_or_none(name))
            .collect();
        self.forward(PackageEvent::PackagesAvailable { apps });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DevicePackage, MemoryDevice};
    use std::sync::mpsc;

    fn listener(device: &Arc<MemoryDevice>) -> (ForwardingListener, mpsc::Receiver<PackageEvent>) {
        let (tx, rx) = mpsc::channel();
        let listener = ForwardingListener::new(AppInventory::new(device.clone()), Arc::new(tx));
        (listener, rx)
    }

    #[test]
    fn removed_is_forwarded_verbatim() {
        let device = Arc::new(MemoryDevice::new());
        let (listener, rx) = listener(&device);
        listener.on_package_removed("com.gone");
        assert_eq!(
            rx.try_recv().expect("event"),
            PackageEvent::PackageRemoved {
                package_name: "com.gone".into()
            }
        );
    }

    #[test]
    fn added_without_activity_is_dropped() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.svc", "Service"));
        device.install(DevicePackage::new("com.tv", "TV").with_leanback());
        let (listener, rx) = listener(&device);

        listener.on_package_added("com.svc");
        listener.on_package_added("com.tv");
        listener.on_package_changed("com.svc");

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PackageEvent::PackageAdded { app } if app.package_name == "com.tv"));
    }

    #[test]
    fn available_batch_keeps_unresolved_entries() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("ok", "Ok").with_launcher());
        let (listener, rx) = listener(&device);

        listener.on_packages_available(&["ok".into(), "missing".into()], true);
        match rx.try_recv().expect("event") {
            PackageEvent::PackagesAvailable { apps } => {
                assert_eq!(apps.len(), 2);
                assert!(apps[0].as_ref().is_some_and(|a| a.sideloaded));
                assert!(apps[1].is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_available_batch_is_not_emitted() {
        let device = Arc::new(MemoryDevice::new());
        let (listener, rx) = listener(&device);
        listener.on_packages_available(&[], false);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn deactivated_listener_is_silent() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.tv", "TV").with_leanback());
        let (listener, rx) = listener(&device);
        listener.deactivate();

        listener.on_package_removed("com.tv");
        listener.on_package_added("com.tv");
        listener.on_packages_available(&["com.tv".into()], false);
        assert!(rx.try_recv().is_err());
    }
}
