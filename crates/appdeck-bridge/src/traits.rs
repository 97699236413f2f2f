// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the package manager, its change
// callbacks, and the push channel towards the UI layer.

use std::sync::Arc;

use appdeck_core::error::Result;
use appdeck_core::{
    ActivityInfo, ApplicationInfo, CallbackId, Drawable, Intent, LaunchCategory, PackageEvent,
    PackageFlags,
};

/// Package manager, activity launcher and package-change registry of the device.
///
/// Every method is a single synchronous platform call. "Not found"
/// conditions come back as `LauncherError::PackageNotFound`; everything else
/// the platform throws is `LauncherError::Bridge`.
pub trait PackageService: Send + Sync {
    /// Package id of the process hosting the bridge.
    fn package_name(&self) -> Result<String>;

    /// Platform API level (`Build.VERSION.SDK_INT`).
    fn sdk_int(&self) -> u32;

    /// Activities matching an intent, in platform order.
    fn query_intent_activities(&self, intent: &Intent) -> Result<Vec<ActivityInfo>>;

    /// Launch intent of a package for one category, or `None` if it has no
    /// entry point there.
    fn launch_intent_for_package(
        &self,
        package_name: &str,
        category: LaunchCategory,
    ) -> Result<Option<Intent>>;

    /// Best activity for an intent, or `None` if nothing handles it.
    fn resolve_activity(&self, intent: &Intent) -> Result<Option<ActivityInfo>>;

    /// Application metadata lookup.
    fn application_info(&self, package_name: &str, flags: PackageFlags)
    -> Result<ApplicationInfo>;

    /// `PackageInfo.versionName`.
    fn package_version(&self, package_name: &str) -> Result<Option<String>>;

    /// User-visible label of an activity.
    fn load_label(&self, activity: &ActivityInfo) -> Result<String>;

    /// TV banner of an activity, rasterized at intrinsic size.
    fn load_banner(&self, activity: &ActivityInfo) -> Result<Option<Drawable>>;

    /// Icon of an activity, rasterized at intrinsic size.
    fn load_icon(&self, activity: &ActivityInfo) -> Result<Option<Drawable>>;

    /// Start an activity. Returns once the platform accepted the intent.
    fn start_activity(&self, intent: &Intent) -> Result<()>;

    /// Register a package-change callback.
    fn register_callback(&self, callback: Arc<dyn PackageCallback>) -> Result<CallbackId>;

    /// Unregister a callback. Unknown ids are a no-op.
    fn unregister_callback(&self, id: CallbackId) -> Result<()>;
}

/// Package-change notifications, as delivered by `LauncherApps.Callback`.
///
/// Invoked on the platform's dispatcher thread.
pub trait PackageCallback: Send + Sync {
    fn on_package_removed(&self, package_name: &str);

    fn on_package_added(&self, package_name: &str);

    fn on_package_changed(&self, package_name: &str);

    fn on_packages_available(&self, package_names: &[String], replacing: bool);

    fn on_packages_unavailable(&self, _package_names: &[String], _replacing: bool) {}
}

/// Push channel towards the UI layer. Fire-and-forget.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PackageEvent);
}

impl EventSink for tokio::sync::mpsc::UnboundedSender<PackageEvent> {
    fn emit(&self, event: PackageEvent) {
        if self.send(event).is_err() {
            tracing::debug!("event receiver dropped, discarding package event");
        }
    }
}

impl EventSink for std::sync::mpsc::Sender<PackageEvent> {
    fn emit(&self, event: PackageEvent) {
        if self.send(event).is_err() {
            tracing::debug!("event receiver dropped, discarding package event");
        }
    }
}
