// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory device. Implements `PackageService` over a list of packages so
// the bridge can be driven without a phone or TV: used by the unit tests and
// by the desktop host harness (`appdeck-host --fixture device.json`).
//
// Mutators (`install`, `uninstall`, `change`, `make_available`) update the
// package list and then fire the registered callbacks, the same order the
// platform uses. Callbacks run with the state lock released.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use appdeck_core::config::DEFAULT_APPLICATION_ID;
use appdeck_core::error::{LauncherError, Result};
use appdeck_core::intent::{
    ACTION_GET_CONTENT, ACTION_MAIN, CATEGORY_HOME, CATEGORY_LAUNCHER, CATEGORY_LEANBACK_LAUNCHER,
};
use appdeck_core::{
    ActivityInfo, ApplicationInfo, CallbackId, Drawable, Intent, LaunchCategory, PackageFlags,
};
use serde::{Deserialize, Serialize};

use crate::traits::{PackageCallback, PackageService};

/// Activity the platform answers with when several apps claim the home role
/// and the user has not picked one.
const RESOLVER_PACKAGE: &str = "android";
const RESOLVER_ACTIVITY: &str = "com.android.internal.app.ResolverActivity";

/// One installed package and the entry points it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePackage {
    pub package_name: String,
    pub label: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Activity declared with `LEANBACK_LAUNCHER`.
    #[serde(default)]
    pub leanback_activity: Option<String>,
    /// Activity declared with `LAUNCHER`.
    #[serde(default)]
    pub launcher_activity: Option<String>,
    #[serde(default)]
    pub banner: Option<Drawable>,
    #[serde(default)]
    pub icon: Option<Drawable>,
    /// Handles `GET_CONTENT` for images.
    #[serde(default)]
    pub content_picker: bool,
    /// Declares a `HOME` activity.
    #[serde(default)]
    pub home: bool,
}

impl DevicePackage {
    pub fn new(package_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            label: label.into(),
            version: Some("1.0".into()),
            leanback_activity: None,
            launcher_activity: None,
            banner: None,
            icon: None,
            content_picker: false,
            home: false,
        }
    }

    pub fn with_leanback(mut self) -> Self {
        self.leanback_activity = Some(format!("{}.TvActivity", self.package_name));
        self
    }

    pub fn with_launcher(mut self) -> Self {
        self.launcher_activity = Some(format!("{}.MainActivity", self.package_name));
        self
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_owned);
        self
    }

    pub fn with_banner(mut self, banner: Drawable) -> Self {
        self.banner = Some(banner);
        self
    }

    pub fn with_icon(mut self, icon: Drawable) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn as_content_picker(mut self) -> Self {
        self.content_picker = true;
        self
    }

    pub fn as_home(mut self) -> Self {
        self.home = true;
        self
    }

    fn entry_point(&self, category: LaunchCategory) -> Option<&str> {
        match category {
            LaunchCategory::Leanback => self.leanback_activity.as_deref(),
            LaunchCategory::Launcher => self.launcher_activity.as_deref(),
        }
    }
}

/// Serialized device description loaded by the host harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceFixture {
    /// Package id of the process hosting the bridge.
    pub package_name: String,
    pub sdk_int: u32,
    /// Package the user picked as default home app.
    pub default_home: Option<String>,
    pub packages: Vec<DevicePackage>,
}

impl Default for DeviceFixture {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_APPLICATION_ID.into(),
            sdk_int: 33,
            default_home: None,
            packages: Vec::new(),
        }
    }
}

impl DeviceFixture {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}

struct DeviceState {
    fixture: DeviceFixture,
    /// Uninstalled packages whose data was kept.
    retained: Vec<String>,
    callbacks: BTreeMap<CallbackId, Arc<dyn PackageCallback>>,
    next_callback: u64,
    started: Vec<Intent>,
    unregister_calls: usize,
    reject_starts: bool,
    fail_queries: bool,
}

impl DeviceState {
    fn package(&self, package_name: &str) -> Option<&DevicePackage> {
        self.fixture
            .packages
            .iter()
            .find(|p| p.package_name == package_name)
    }

    fn require(&self, package_name: &str) -> Result<&DevicePackage> {
        self.package(package_name)
            .ok_or_else(|| LauncherError::PackageNotFound(package_name.into()))
    }

    fn is_installed(&self, package_name: &str) -> bool {
        self.package(package_name).is_some()
    }

    fn home_activities(&self) -> Vec<ActivityInfo> {
        self.fixture
            .packages
            .iter()
            .filter(|p| p.home)
            .map(|p| ActivityInfo::new(&p.package_name, format!("{}.HomeActivity", p.package_name)))
            .collect()
    }
}

/// `PackageService` backed by an in-memory package list.
pub struct MemoryDevice {
    state: Mutex<DeviceState>,
}

impl MemoryDevice {
    /// Empty device on API 33.
    pub fn new() -> Self {
        Self::from_fixture(DeviceFixture::default())
    }

    pub fn from_fixture(fixture: DeviceFixture) -> Self {
        Self {
            state: Mutex::new(DeviceState {
                fixture,
                retained: Vec::new(),
                callbacks: BTreeMap::new(),
                next_callback: 1,
                started: Vec::new(),
                unregister_calls: 0,
                reject_starts: false,
                fail_queries: false,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().expect("device state lock poisoned")
    }

    fn callbacks(&self) -> Vec<Arc<dyn PackageCallback>> {
        self.state().callbacks.values().cloned().collect()
    }

    // -- Device mutation ----------------------------------------------------

    /// Install or update a package, then notify callbacks (added or changed).
    pub fn install(&self, package: DevicePackage) {
        let name = package.package_name.clone();
        let updated = {
            let mut state = self.state();
            state.retained.retain(|p| *p != name);
            let position = state
                .fixture
                .packages
                .iter()
                .position(|p| p.package_name == name);
            match position {
                Some(index) => {
                    state.fixture.packages[index] = package;
                    true
                }
                None => {
                    state.fixture.packages.push(package);
                    false
                }
            }
        };
        for callback in self.callbacks() {
            if updated {
                callback.on_package_changed(&name);
            } else {
                callback.on_package_added(&name);
            }
        }
    }

    /// Remove a package and notify callbacks. With `keep_data` the package
    /// stays visible to uninstalled-package lookups on API 24+.
    pub fn uninstall(&self, package_name: &str, keep_data: bool) {
        let removed = {
            let mut state = self.state();
            let before = state.fixture.packages.len();
            state.fixture.packages.retain(|p| p.package_name != package_name);
            let removed = state.fixture.packages.len() != before;
            if removed
                && keep_data
                && state.fixture.sdk_int >= PackageFlags::MATCH_UNINSTALLED_MIN_SDK
            {
                state.retained.push(package_name.into());
            }
            removed
        };
        if removed {
            for callback in self.callbacks() {
                callback.on_package_removed(package_name);
            }
        }
    }

    /// Fire a change notification without touching the package list.
    pub fn change(&self, package_name: &str) {
        for callback in self.callbacks() {
            callback.on_package_changed(package_name);
        }
    }

    /// Fire an added notification without touching the package list, as the
    /// platform does transiently for packages it is still setting up.
    pub fn notify_added(&self, package_name: &str) {
        for callback in self.callbacks() {
            callback.on_package_added(package_name);
        }
    }

    /// Fire a batch availability notification.
    pub fn make_available(&self, package_names: &[String], replacing: bool) {
        for callback in self.callbacks() {
            callback.on_packages_available(package_names, replacing);
        }
    }

    /// Fire a batch unavailability notification.
    pub fn make_unavailable(&self, package_names: &[String], replacing: bool) {
        for callback in self.callbacks() {
            callback.on_packages_unavailable(package_names, replacing);
        }
    }

    // -- Failure injection --------------------------------------------------

    /// Make every `start_activity` fail as if the platform threw.
    pub fn set_reject_starts(&self, reject: bool) {
        self.state().reject_starts = reject;
    }

    /// Make every intent query fail.
    pub fn set_fail_queries(&self, fail: bool) {
        self.state().fail_queries = fail;
    }

    pub fn set_default_home(&self, package_name: Option<&str>) {
        self.state().fixture.default_home = package_name.map(str::to_owned);
    }

    // -- Inspection ---------------------------------------------------------

    /// Intents accepted by `start_activity`, oldest first.
    pub fn started_intents(&self) -> Vec<Intent> {
        self.state().started.clone()
    }

    pub fn registered_callbacks(&self) -> usize {
        self.state().callbacks.len()
    }

    /// Number of `unregister_callback` calls, known ids or not.
    pub fn unregister_calls(&self) -> usize {
        self.state().unregister_calls
    }
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageService for MemoryDevice {
    fn package_name(&self) -> Result<String> {
        Ok(self.state().fixture.package_name.clone())
    }

    fn sdk_int(&self) -> u32 {
        self.state().fixture.sdk_int
    }

    fn query_intent_activities(&self, intent: &Intent) -> Result<Vec<ActivityInfo>> {
        let state = self.state();
        if state.fail_queries {
            return Err(LauncherError::Bridge("package manager has died".into()));
        }

        let packages = &state.fixture.packages;
        let by_category = |category: LaunchCategory| -> Vec<ActivityInfo> {
            packages
                .iter()
                .filter_map(|p| {
                    p.entry_point(category)
                        .map(|class| ActivityInfo::new(&p.package_name, class))
                })
                .collect()
        };

        let found = match intent.action.as_str() {
            ACTION_MAIN if intent.has_category(CATEGORY_LEANBACK_LAUNCHER) => {
                by_category(LaunchCategory::Leanback)
            }
            ACTION_MAIN if intent.has_category(CATEGORY_LAUNCHER) => {
                by_category(LaunchCategory::Launcher)
            }
            ACTION_MAIN if intent.has_category(CATEGORY_HOME) => state.home_activities(),
            ACTION_GET_CONTENT => packages
                .iter()
                .filter(|p| p.content_picker)
                .map(|p| ActivityInfo::new(&p.package_name, format!("{}.PickActivity", p.package_name)))
                .collect(),
            _ => Vec::new(),
        };
        Ok(found)
    }

    fn launch_intent_for_package(
        &self,
        package_name: &str,
        category: LaunchCategory,
    ) -> Result<Option<Intent>> {
        let state = self.state();
        let intent = state
            .package(package_name)
            .and_then(|p| p.entry_point(category))
            .map(|class| {
                Intent::launch(
                    category.intent_category(),
                    appdeck_core::ComponentName::new(package_name, class),
                )
            });
        Ok(intent)
    }

    fn resolve_activity(&self, intent: &Intent) -> Result<Option<ActivityInfo>> {
        if intent.action == ACTION_MAIN && intent.has_category(CATEGORY_HOME) {
            let state = self.state();
            if state.fail_queries {
                return Err(LauncherError::Bridge("package manager has died".into()));
            }
            if let Some(default) = state.fixture.default_home.as_deref() {
                if state.package(default).is_some_and(|p| p.home) {
                    return Ok(Some(ActivityInfo::new(default, format!("{default}.HomeActivity"))));
                }
            }
            let mut homes = state.home_activities();
            return Ok(match homes.len() {
                0 => None,
                1 => homes.pop(),
                _ => Some(ActivityInfo::new(RESOLVER_PACKAGE, RESOLVER_ACTIVITY)),
            });
        }

        if let Some(component) = &intent.component {
            let state = self.state();
            return Ok(state
                .package(&component.package)
                .map(|_| ActivityInfo::new(&component.package, &component.class)));
        }

        Ok(self.query_intent_activities(intent)?.into_iter().next())
    }

    fn application_info(
        &self,
        package_name: &str,
        flags: PackageFlags,
    ) -> Result<ApplicationInfo> {
        let state = self.state();
        if state.is_installed(package_name) {
            return Ok(ApplicationInfo {
                package_name: package_name.into(),
                installed: true,
            });
        }
        if flags.includes_uninstalled() && state.retained.iter().any(|p| p == package_name) {
            return Ok(ApplicationInfo {
                package_name: package_name.into(),
                installed: false,
            });
        }
        Err(LauncherError::PackageNotFound(package_name.into()))
    }

    fn package_version(&self, package_name: &str) -> Result<Option<String>> {
        Ok(self.state().require(package_name)?.version.clone())
    }

    fn load_label(&self, activity: &ActivityInfo) -> Result<String> {
        Ok(self.state().require(&activity.package_name)?.label.clone())
    }

    fn load_banner(&self, activity: &ActivityInfo) -> Result<Option<Drawable>> {
        Ok(self.state().require(&activity.package_name)?.banner.clone())
    }

    fn load_icon(&self, activity: &ActivityInfo) -> Result<Option<Drawable>> {
        Ok(self.state().require(&activity.package_name)?.icon.clone())
    }

    fn start_activity(&self, intent: &Intent) -> Result<()> {
        let mut state = self.state();
        if state.reject_starts {
            return Err(LauncherError::Bridge(format!(
                "SecurityException: permission denial starting {intent}"
            )));
        }
        if let Some(component) = &intent.component {
            if !state.is_installed(&component.package) {
                return Err(LauncherError::ActivityNotFound(intent.to_string()));
            }
        }
        state.started.push(intent.clone());
        Ok(())
    }

    fn register_callback(&self, callback: Arc<dyn PackageCallback>) -> Result<CallbackId> {
        let mut state = self.state();
        let id = CallbackId(state.next_callback);
        state.next_callback += 1;
        state.callbacks.insert(id, callback);
        Ok(id)
    }

    fn unregister_callback(&self, id: CallbackId) -> Result<()> {
        let mut state = self.state();
        state.unregister_calls += 1;
        state.callbacks.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_follow_install_order() {
        let device = MemoryDevice::new();
        device.install(DevicePackage::new("b", "B").with_leanback());
        device.install(DevicePackage::new("a", "A").with_leanback());
        let found = device
            .query_intent_activities(&Intent::launcher_query(CATEGORY_LEANBACK_LAUNCHER))
            .expect("query");
        let names: Vec<_> = found.iter().map(|a| a.package_name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn retained_package_visible_only_with_flag() {
        let device = MemoryDevice::new();
        device.install(DevicePackage::new("keep", "Keep").with_launcher());
        device.uninstall("keep", true);

        let info = device
            .application_info("keep", PackageFlags::MATCH_UNINSTALLED_PACKAGES)
            .expect("retained");
        assert!(!info.installed);
        assert!(matches!(
            device.application_info("keep", PackageFlags::NONE),
            Err(LauncherError::PackageNotFound(_))
        ));
    }

    #[test]
    fn old_platform_does_not_retain() {
        let device = MemoryDevice::from_fixture(DeviceFixture {
            sdk_int: 23,
            ..DeviceFixture::default()
        });
        device.install(DevicePackage::new("keep", "Keep").with_launcher());
        device.uninstall("keep", true);
        assert!(device
            .application_info("keep", PackageFlags::GET_UNINSTALLED_PACKAGES)
            .is_err());
    }

    #[test]
    fn ambiguous_home_resolves_to_chooser() {
        let device = MemoryDevice::new();
        device.install(DevicePackage::new("one", "One").as_home());
        device.install(DevicePackage::new("two", "Two").as_home());
        let resolved = device.resolve_activity(&Intent::home()).expect("resolve").expect("some");
        assert_eq!(resolved.package_name, RESOLVER_PACKAGE);

        device.set_default_home(Some("two"));
        let resolved = device.resolve_activity(&Intent::home()).expect("resolve").expect("some");
        assert_eq!(resolved.package_name, "two");
    }

    #[test]
    fn fixture_parses_with_defaults() {
        let fixture: DeviceFixture = serde_json::from_str(
            r#"{"packages": [{"package_name": "com.x", "label": "X", "leanback_activity": "com.x.Tv"}]}"#,
        )
        .expect("fixture");
        assert_eq!(fixture.sdk_int, 33);
        assert_eq!(fixture.packages[0].version, None);
        assert!(!fixture.packages[0].home);
    }

    #[test]
    fn fixture_loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("device.json");
        std::fs::write(
            &path,
            r#"{"sdk_int": 23, "default_home": "com.home", "packages": [{"package_name": "com.home", "label": "Home", "home": true}]}"#,
        )
        .expect("write");

        let device = MemoryDevice::from_fixture(DeviceFixture::load(&path).expect("load"));
        assert_eq!(device.sdk_int(), 23);
        assert!(DeviceFixture::load(dir.path().join("missing.json")).is_err());
    }
}
