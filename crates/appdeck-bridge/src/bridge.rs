// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridge component: owns the inventory, the system actions and the
// listener registry, and answers call-channel requests.

use std::sync::Arc;

use appdeck_core::error::Result;
use appdeck_core::{BridgeConfig, SubscriptionId};
use tracing::{debug, info};

use crate::actions::SystemActions;
use crate::channel::{Method, MethodCall, MethodResponse};
use crate::inventory::AppInventory;
use crate::registry::ListenerRegistry;
use crate::traits::{EventSink, PackageService};

/// Application inventory bridge bound to one package service.
///
/// Calls run synchronously on the caller's thread. Dropping the bridge
/// unregisters every listener it still holds.
pub struct LauncherBridge {
    config: BridgeConfig,
    inventory: AppInventory,
    actions: SystemActions,
    registry: ListenerRegistry,
}

impl LauncherBridge {
    pub fn new(service: Arc<dyn PackageService>, config: BridgeConfig) -> Self {
        let inventory = AppInventory::new(service.clone());
        let actions = SystemActions::new(
            service,
            config.ambient_component.clone(),
            config.content_mime_type.clone(),
        );
        info!(
            method_channel = %config.method_channel,
            event_channel = %config.event_channel,
            "Launcher bridge attached"
        );
        Self {
            registry: ListenerRegistry::new(inventory.clone()),
            config,
            inventory,
            actions,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn inventory(&self) -> &AppInventory {
        &self.inventory
    }

    pub fn actions(&self) -> &SystemActions {
        &self.actions
    }

    /// Answer one call-channel request.
    ///
    /// Unknown methods and malformed arguments fail with an invalid-argument
    /// error; every platform failure inside an action is already folded into
    /// `false`.
    pub fn handle(&self, call: &MethodCall) -> Result<MethodResponse> {
        let method = call.parse_method()?;
        debug!(%method, "Call received");

        let response = match method {
            Method::GetApplications => MethodResponse::Applications(self.inventory.applications()?),
            Method::ApplicationExists => {
                MethodResponse::Flag(self.inventory.exists(call.package_argument()?))
            }
            Method::LaunchApp => MethodResponse::Flag(self.actions.launch_app(call.package_argument()?)),
            Method::OpenSettings => MethodResponse::Flag(self.actions.open_settings()),
            Method::OpenAppInfo => {
                MethodResponse::Flag(self.actions.open_app_info(call.package_argument()?))
            }
            Method::UninstallApp => {
                MethodResponse::Flag(self.actions.uninstall_app(call.package_argument()?))
            }
            Method::IsDefaultLauncher => MethodResponse::Flag(self.actions.is_default_launcher()),
            Method::CheckForGetContentAvailability => {
                MethodResponse::Flag(self.actions.content_picker_available())
            }
            Method::StartAmbientMode => MethodResponse::Flag(self.actions.start_ambient_mode()),
        };
        Ok(response)
    }

    /// Open an event stream (push channel `onListen`).
    pub fn listen(&mut self, sink: Arc<dyn EventSink>) -> Result<SubscriptionId> {
        self.registry.subscribe(sink)
    }

    /// Close an event stream (push channel `onCancel`).
    pub fn cancel(&mut self, id: SubscriptionId) -> bool {
        self.registry.cancel(id)
    }

    pub fn active_subscriptions(&self) -> usize {
        self.registry.len()
    }

    /// Release every listener. Idempotent; also runs on drop.
    pub fn teardown(&mut self) -> usize {
        self.registry.clear()
    }
}
