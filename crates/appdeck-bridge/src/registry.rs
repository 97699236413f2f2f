// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registry of live event-stream subscriptions and their platform callbacks.
//
// Every callback registered with the package service is unregistered exactly
// once: on cancel, on `clear`, or when the registry is dropped.

use std::sync::Arc;

use appdeck_core::error::Result;
use appdeck_core::{CallbackId, SubscriptionId};
use tracing::{info, warn};

use crate::events::ForwardingListener;
use crate::inventory::AppInventory;
use crate::traits::{EventSink, PackageService};

struct ListenerRegistration {
    id: SubscriptionId,
    callback: CallbackId,
    listener: Arc<ForwardingListener>,
}

/// Subscriptions owned by one bridge instance.
pub struct ListenerRegistry {
    inventory: AppInventory,
    registrations: Vec<ListenerRegistration>,
}

impl ListenerRegistry {
    pub fn new(inventory: AppInventory) -> Self {
        Self {
            inventory,
            registrations: Vec::new(),
        }
    }

    fn service(&self) -> &Arc<dyn PackageService> {
        self.inventory.service()
    }

    /// Register a new listener forwarding to `sink`.
    pub fn subscribe(&mut self, sink: Arc<dyn EventSink>) -> Result<SubscriptionId> {
        let listener = Arc::new(ForwardingListener::new(self.inventory.clone(), sink));
        let callback = self.service().register_callback(listener.clone())?;
        let id = SubscriptionId::new();
        self.registrations.push(ListenerRegistration {
            id,
            callback,
            listener,
        });
        info!(subscription = %id, active = self.registrations.len(), "Event stream subscribed");
        Ok(id)
    }

    /// Stop one subscription. Returns false if it was not active.
    pub fn cancel(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.registrations.iter().position(|r| r.id == id) else {
            return false;
        };
        let registration = self.registrations.swap_remove(index);
        self.release(registration);
        info!(subscription = %id, active = self.registrations.len(), "Event stream cancelled");
        true
    }

    /// Stop every subscription. Safe to call repeatedly.
    pub fn clear(&mut self) -> usize {
        let drained: Vec<_> = self.registrations.drain(..).collect();
        let count = drained.len();
        for registration in drained {
            self.release(registration);
        }
        if count > 0 {
            info!(released = count, "Event streams torn down");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.registrations.iter().any(|r| r.id == id)
    }

    fn release(&self, registration: ListenerRegistration) {
        registration.listener.deactivate();
        if let Err(e) = self.service().unregister_callback(registration.callback) {
            warn!(
                subscription = %registration.id,
                error = %e,
                "Failed to unregister package callback"
            );
        }
    }
}

impl Drop for ListenerRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DevicePackage, MemoryDevice};
    use appdeck_core::PackageEvent;
    use std::sync::mpsc;

    fn registry(device: &Arc<MemoryDevice>) -> ListenerRegistry {
        ListenerRegistry::new(AppInventory::new(device.clone()))
    }

    #[test]
    fn subscribe_registers_one_callback_each() {
        let device = Arc::new(MemoryDevice::new());
        let mut registry = registry(&device);
        let (tx, _rx) = mpsc::channel::<PackageEvent>();
        let sink: Arc<dyn EventSink> = Arc::new(tx);

        let a = registry.subscribe(sink.clone()).expect("subscribe a");
        let b = registry.subscribe(sink).expect("subscribe b");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(device.registered_callbacks(), 2);
    }

    #[test]
    fn cancel_stops_delivery_and_unregisters() {
        let device = Arc::new(MemoryDevice::new());
        let mut registry = registry(&device);
        let (tx, rx) = mpsc::channel();
        let id = registry.subscribe(Arc::new(tx)).expect("subscribe");

        device.install(DevicePackage::new("com.tv", "TV").with_leanback());
        assert!(rx.try_recv().is_ok());

        assert!(registry.contains(id));
        assert!(registry.cancel(id));
        assert!(!registry.contains(id));
        assert_eq!(device.registered_callbacks(), 0);
        device.uninstall("com.tv", false);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn device_notifications_reach_subscriber() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.tv", "TV").with_leanback());
        let mut registry = registry(&device);
        let (tx, rx) = mpsc::channel();
        registry.subscribe(Arc::new(tx)).expect("subscribe");

        // Not installed yet: nothing resolves, nothing is sent.
        device.notify_added("com.pending");
        device.make_unavailable(&["com.tv".into()], false);
        assert!(rx.try_recv().is_err());

        device.notify_added("com.tv");
        assert!(matches!(
            rx.try_recv().expect("event"),
            PackageEvent::PackageAdded { app } if app.package_name == "com.tv"
        ));
    }

    #[test]
    fn cancel_unknown_is_noop() {
        let device = Arc::new(MemoryDevice::new());
        let mut registry = registry(&device);
        assert!(!registry.cancel(SubscriptionId::new()));
        assert_eq!(device.unregister_calls(), 0);
    }

    #[test]
    fn clear_is_idempotent() {
        let device = Arc::new(MemoryDevice::new());
        let mut registry = registry(&device);
        for _ in 0..3 {
            let (tx, _rx) = mpsc::channel::<PackageEvent>();
            registry.subscribe(Arc::new(tx)).expect("subscribe");
        }

        assert_eq!(registry.clear(), 3);
        assert_eq!(registry.clear(), 0);
        assert!(registry.is_empty());
        assert_eq!(device.unregister_calls(), 3);
        assert_eq!(device.registered_callbacks(), 0);
    }

    #[test]
    fn drop_releases_listeners() {
        let device = Arc::new(MemoryDevice::new());
        {
            let mut registry = registry(&device);
            let (tx, _rx) = mpsc::channel::<PackageEvent>();
            registry.subscribe(Arc::new(tx)).expect("subscribe");
        }
        assert_eq!(device.unregister_calls(), 1);
        assert_eq!(device.registered_callbacks(), 0);
    }
}
