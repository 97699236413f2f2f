// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fire-and-forget system actions. Each one dispatches a single intent and
// reports whether the platform accepted it; nothing tracks what the started
// activity does afterwards.

use std::sync::Arc;

use appdeck_core::error::Result;
use appdeck_core::{ComponentName, Intent};
use tracing::{info, warn};

use crate::resolve::LaunchResolution;
use crate::traits::PackageService;

/// Launch, settings, uninstall and role probes.
#[derive(Clone)]
pub struct SystemActions {
    service: Arc<dyn PackageService>,
    ambient_component: ComponentName,
    content_mime_type: String,
}

impl SystemActions {
    pub fn new(
        service: Arc<dyn PackageService>,
        ambient_component: ComponentName,
        content_mime_type: impl Into<String>,
    ) -> Self {
        Self {
            service,
            ambient_component,
            content_mime_type: content_mime_type.into(),
        }
    }

    /// Start a package's launch activity, leanback entry preferred.
    pub fn launch_app(&self, package_name: &str) -> bool {
        let resolution = match LaunchResolution::lookup(self.service.as_ref(), package_name) {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(package = package_name, error = %e, "Launch intent lookup failed");
                return false;
            }
        };
        match resolution.into_intent() {
            Some(intent) => self.start("launchApp", &intent),
            None => {
                info!(package = package_name, "Package has no launch intent");
                false
            }
        }
    }

    /// Open the system settings root.
    pub fn open_settings(&self) -> bool {
        self.start("openSettings", &Intent::settings())
    }

    /// Open the app-info page of a package.
    pub fn open_app_info(&self, package_name: &str) -> bool {
        self.start("openAppInfo", &Intent::app_details(package_name))
    }

    /// Show the system uninstall prompt for a package.
    pub fn uninstall_app(&self, package_name: &str) -> bool {
        self.start("uninstallApp", &Intent::delete_package(package_name))
    }

    /// Start the screensaver activity.
    pub fn start_ambient_mode(&self) -> bool {
        self.start(
            "startAmbientMode",
            &Intent::main_component(self.ambient_component.clone()),
        )
    }

    /// Whether any installed activity can pick image content.
    pub fn content_picker_available(&self) -> bool {
        let intent = Intent::get_content(&self.content_mime_type);
        self.probe("checkForGetContentAvailability", || {
            Ok(!self.service.query_intent_activities(&intent)?.is_empty())
        })
    }

    /// Whether this process's package currently holds the home role.
    pub fn is_default_launcher(&self) -> bool {
        self.probe("isDefaultLauncher", || {
            let own = self.service.package_name()?;
            let home = self.service.resolve_activity(&Intent::home())?;
            Ok(home.is_some_and(|activity| activity.package_name == own))
        })
    }

    fn start(&self, action: &str, intent: &Intent) -> bool {
        match self.service.start_activity(intent) {
            Ok(()) => {
                info!(action, %intent, "Activity started");
                true
            }
            Err(e) => {
                warn!(action, %intent, error = %e, "Activity start rejected");
                false
            }
        }
    }

    fn probe(&self, action: &str, query: impl FnOnce() -> Result<bool>) -> bool {
        query().unwrap_or_else(|e| {
            warn!(action, error = %e, "Platform query failed");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DevicePackage, MemoryDevice};
    use appdeck_core::intent::{
        ACTION_APPLICATION_DETAILS_SETTINGS, ACTION_DELETE, ACTION_SETTINGS, CATEGORY_LAUNCHER,
        FLAG_ACTIVITY_NEW_TASK,
    };
    use appdeck_core::{BridgeConfig, LaunchCategory};

    fn actions(device: &Arc<MemoryDevice>) -> SystemActions {
        let config = BridgeConfig::default();
        SystemActions::new(device.clone(), config.ambient_component, config.content_mime_type)
    }

    #[test]
    fn launch_prefers_leanback_intent() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.tv", "TV").with_leanback().with_launcher());
        assert!(actions(&device).launch_app("com.tv"));

        let started = device.started_intents();
        assert_eq!(started.len(), 1);
        let component = started[0].component.as_ref().expect("explicit");
        assert_eq!(component.class, "com.tv.TvActivity");
    }

    #[test]
    fn launch_starts_platform_intent_unchanged() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.phone", "Phone").with_launcher());
        let resolved = device
            .launch_intent_for_package("com.phone", LaunchCategory::Launcher)
            .expect("lookup")
            .expect("launchable");
        assert!(actions(&device).launch_app("com.phone"));

        let started = device.started_intents();
        assert_eq!(started, [resolved]);
        assert!(started[0].has_flags(FLAG_ACTIVITY_NEW_TASK));
        assert!(started[0].has_category(CATEGORY_LAUNCHER));
    }

    #[test]
    fn launch_unknown_package_is_false() {
        let device = Arc::new(MemoryDevice::new());
        assert!(!actions(&device).launch_app("com.missing"));
        assert!(device.started_intents().is_empty());
    }

    #[test]
    fn rejected_start_is_false() {
        let device = Arc::new(MemoryDevice::new());
        device.install(DevicePackage::new("com.tv", "TV").with_leanback());
        device.set_reject_starts(true);
        let actions = actions(&device);
        assert!(!actions.launch_app("com.tv"));
        assert!(!actions.open_settings());
        assert!(!actions.uninstall_app("com.tv"));
    }

    #[test]
    fn settings_and_package_pages_dispatch_expected_intents() {
        let device = Arc::new(MemoryDevice::new());
        let actions = actions(&device);
        assert!(actions.open_settings());
        assert!(actions.open_app_info("com.tv"));
        assert!(actions.uninstall_app("com.tv"));

        let started = device.started_intents();
        let summary: Vec<_> = started
            .iter()
            .map(|i| (i.action.as_str(), i.data.as_ref().map(ToString::to_string)))
            .collect();
        assert_eq!(
            summary,
            [
                (ACTION_SETTINGS, None),
                (ACTION_APPLICATION_DETAILS_SETTINGS, Some("package:com.tv".to_string())),
                (ACTION_DELETE, Some("package:com.tv".to_string())),
            ]
        );
    }

    #[test]
    fn ambient_mode_needs_screensaver_component() {
        let device = Arc::new(MemoryDevice::new());
        assert!(!actions(&device).start_ambient_mode());

        device.install(DevicePackage::new("com.android.systemui", "System UI"));
        assert!(actions(&device).start_ambient_mode());
    }

    #[test]
    fn content_picker_probe() {
        let device = Arc::new(MemoryDevice::new());
        assert!(!actions(&device).content_picker_available());

        device.install(DevicePackage::new("com.gallery", "Gallery").as_content_picker());
        assert!(actions(&device).content_picker_available());

        device.set_fail_queries(true);
        assert!(!actions(&device).content_picker_available());
    }

    #[test]
    fn default_launcher_compares_own_package() {
        let device = Arc::new(MemoryDevice::new());
        let own = BridgeConfig::default().application_id;
        device.install(DevicePackage::new(own.as_str(), "Appdeck").with_leanback().as_home());
        assert!(actions(&device).is_default_launcher());

        device.install(DevicePackage::new("com.stock.home", "Stock").as_home());
        assert!(!actions(&device).is_default_launcher());

        device.set_default_home(Some(own.as_str()));
        assert!(actions(&device).is_default_launcher());
    }
}
