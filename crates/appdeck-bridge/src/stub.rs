// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub package service for desktop/CI builds where no package manager exists.
//
// Every call returns `PlatformUnavailable`, so every action reports `false`.
// The real implementation lives in the `android` module.

use std::sync::Arc;

use appdeck_core::error::{LauncherError, Result};
use appdeck_core::{
    ActivityInfo, ApplicationInfo, CallbackId, Drawable, Intent, LaunchCategory, PackageFlags,
};

use crate::traits::{PackageCallback, PackageService};

/// No-op package service returned on non-Android platforms.
pub struct StubPackageService;

impl PackageService for StubPackageService {
    fn package_name(&self) -> Result<String> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn sdk_int(&self) -> u32 {
        0
    }

    fn query_intent_activities(&self, _intent: &Intent) -> Result<Vec<ActivityInfo>> {
        tracing::warn!("PackageService::query_intent_activities called on stub service");
        Err(LauncherError::PlatformUnavailable)
    }

    fn launch_intent_for_package(
        &self,
        _package_name: &str,
        _category: LaunchCategory,
    ) -> Result<Option<Intent>> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn resolve_activity(&self, _intent: &Intent) -> Result<Option<ActivityInfo>> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn application_info(
        &self,
        _package_name: &str,
        _flags: PackageFlags,
    ) -> Result<ApplicationInfo> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn package_version(&self, _package_name: &str) -> Result<Option<String>> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn load_label(&self, _activity: &ActivityInfo) -> Result<String> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn load_banner(&self, _activity: &ActivityInfo) -> Result<Option<Drawable>> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn load_icon(&self, _activity: &ActivityInfo) -> Result<Option<Drawable>> {
        Err(LauncherError::PlatformUnavailable)
    }

    fn start_activity(&self, intent: &Intent) -> Result<()> {
        tracing::warn!(%intent, "PackageService::start_activity called on stub service");
        Err(LauncherError::PlatformUnavailable)
    }

    fn register_callback(&self, _callback: Arc<dyn PackageCallback>) -> Result<CallbackId> {
        tracing::warn!("PackageService::register_callback called on stub service");
        Err(LauncherError::PlatformUnavailable)
    }

    fn unregister_callback(&self, _id: CallbackId) -> Result<()> {
        Ok(())
    }
}
