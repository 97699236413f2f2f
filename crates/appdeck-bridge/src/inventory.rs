// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application inventory: enumerate launchable apps, resolve one app, check
// whether a package still exists.

use std::collections::HashSet;
use std::sync::Arc;

use appdeck_core::error::Result;
use appdeck_core::{ActivityInfo, AppRecord, Drawable, Intent, LaunchCategory, PackageFlags};
use tracing::{debug, info, instrument, warn};

use crate::render::drawable_to_png;
use crate::resolve::LaunchResolution;
use crate::traits::PackageService;

/// Read-only view of the installed, launchable applications.
#[derive(Clone)]
pub struct AppInventory {
    service: Arc<dyn PackageService>,
}

impl AppInventory {
    pub fn new(service: Arc<dyn PackageService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<dyn PackageService> {
        &self.service
    }

    /// All launchable apps: leanback entries first, then general-launcher
    /// entries for packages that have no leanback entry.
    ///
    /// Each package appears once. Entries whose package disappears while the
    /// list is built are skipped.
    #[instrument(skip(self))]
    pub fn applications(&self) -> Result<Vec<AppRecord>> {
        let leanback = self.query(LaunchCategory::Leanback)?;
        let general = self.query(LaunchCategory::Launcher)?;
        debug!(
            leanback = leanback.len(),
            general = general.len(),
            "Launcher categories queried"
        );

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(leanback.len() + general.len());
        let tagged = leanback
            .iter()
            .map(|a| (a, LaunchCategory::Leanback))
            .chain(general.iter().map(|a| (a, LaunchCategory::Launcher)));

        for (activity, category) in tagged {
            if !seen.insert(activity.package_name.as_str()) {
                continue;
            }
            match self.build_record(activity, category.sideloaded()) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    package = %activity.package_name,
                    error = %e,
                    "Skipping application that vanished during enumeration"
                ),
            }
        }

        info!(count = records.len(), "Applications enumerated");
        Ok(records)
    }

    /// One app by package id, or `None` if it has no launchable activity.
    pub fn application(&self, package_name: &str) -> Result<Option<AppRecord>> {
        if package_name.is_empty() {
            return Ok(None);
        }

        let resolution = LaunchResolution::lookup(self.service.as_ref(), package_name)?;
        let Some(sideloaded) = resolution.sideloaded() else {
            return Ok(None);
        };
        let Some(intent) = resolution.intent() else {
            return Ok(None);
        };

        match self.service.resolve_activity(intent)? {
            Some(activity) => self.build_record(&activity, sideloaded).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`application`](Self::application) but folds platform errors into
    /// `None`. Used from package-change callbacks, which have nowhere to
    /// report an error to.
    pub fn application_or_none(&self, package_name: &str) -> Option<AppRecord> {
        match self.application(package_name) {
            Ok(app) => app,
            Err(e) => {
                debug!(package = package_name, error = %e, "Application did not resolve");
                None
            }
        }
    }

    /// Whether the platform still knows the package, including packages
    /// uninstalled with their data kept.
    pub fn exists(&self, package_name: &str) -> bool {
        let flags = PackageFlags::uninstalled_for_sdk(self.service.sdk_int());
        match self.service.application_info(package_name, flags) {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                warn!(package = package_name, error = %e, "Application lookup failed");
                false
            }
        }
    }

    fn query(&self, category: LaunchCategory) -> Result<Vec<ActivityInfo>> {
        self.service
            .query_intent_activities(&Intent::launcher_query(category.intent_category()))
    }

    fn build_record(&self, activity: &ActivityInfo, sideloaded: bool) -> Result<AppRecord> {
        let name = self.service.load_label(activity)?;
        let version = self.service.package_version(&activity.package_name)?;
        let banner = self.render(activity, "banner", self.service.load_banner(activity));
        let icon = self.render(activity, "icon", self.service.load_icon(activity));

        Ok(AppRecord {
            name,
            package_name: activity.package_name.clone(),
            banner,
            icon,
            version,
            sideloaded,
        })
    }

    /// Images are optional: any load or encode failure drops the image, not the app.
    fn render(
        &self,
        activity: &ActivityInfo,
        kind: &str,
        loaded: Result<Option<Drawable>>,
    ) -> Option<Vec<u8>> {
        let png = loaded.and_then(|drawable| match drawable {
            Some(drawable) => drawable_to_png(&drawable),
            None => Ok(None),
        });
        match png {
            Ok(png) => png,
            Err(e) => {
                warn!(package = %activity.package_name, kind, error = %e, "Image dropped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DeviceFixture, DevicePackage, MemoryDevice};

    fn inventory(packages: Vec<DevicePackage>) -> (Arc<MemoryDevice>, AppInventory) {
        let device = Arc::new(MemoryDevice::new());
        for p in packages {
            device.install(p);
        }
        let inventory = AppInventory::new(device.clone());
        (device, inventory)
    }

    #[test]
    fn leanback_first_then_general_without_duplicates() {
        // leanback = {A, B}, general = {B, C}
        let (_, inventory) = inventory(vec![
            DevicePackage::new("a", "A").with_leanback(),
            DevicePackage::new("b", "B").with_leanback().with_launcher(),
            DevicePackage::new("c", "C").with_launcher(),
        ]);

        let apps = inventory.applications().expect("enumerate");
        let summary: Vec<_> = apps
            .iter()
            .map(|a| (a.package_name.as_str(), a.sideloaded))
            .collect();
        assert_eq!(summary, [("a", false), ("b", false), ("c", true)]);
    }

    #[test]
    fn general_entries_keep_query_order_after_leanback() {
        let (_, inventory) = inventory(vec![
            DevicePackage::new("z.phone", "Z").with_launcher(),
            DevicePackage::new("y.tv", "Y").with_leanback(),
            DevicePackage::new("x.phone", "X").with_launcher(),
        ]);
        let names: Vec<_> = inventory
            .applications()
            .expect("enumerate")
            .into_iter()
            .map(|a| a.package_name)
            .collect();
        assert_eq!(names, ["y.tv", "z.phone", "x.phone"]);
    }

    #[test]
    fn record_carries_png_images_and_version() {
        let (_, inventory) = inventory(vec![
            DevicePackage::new("com.tv", "Television")
                .with_leanback()
                .with_version(Some("4.2.1"))
                .with_banner(Drawable::solid(32, 18, [0, 0, 0, 255]))
                .with_icon(Drawable::solid(-1, -1, [0; 4])),
        ]);
        let app = inventory.application("com.tv").expect("resolve").expect("found");
        assert_eq!(app.name, "Television");
        assert_eq!(app.version.as_deref(), Some("4.2.1"));
        assert!(app.banner.as_ref().is_some_and(|b| b.starts_with(b"\x89PNG")));
        assert!(app.icon.is_none());
    }

    #[test]
    fn resolve_marks_sideloaded_by_category() {
        let (_, inventory) = inventory(vec![
            DevicePackage::new("tv", "TV").with_leanback(),
            DevicePackage::new("phone", "Phone").with_launcher(),
        ]);
        assert!(!inventory.application("tv").expect("tv").expect("found").sideloaded);
        assert!(inventory.application("phone").expect("phone").expect("found").sideloaded);
    }

    #[test]
    fn resolve_missing_or_headless_package_is_none() {
        let (_, inventory) = inventory(vec![DevicePackage::new("svc", "Service")]);
        assert!(inventory.application("svc").expect("svc").is_none());
        assert!(inventory.application("gone").expect("gone").is_none());
        assert!(inventory.application("").expect("empty").is_none());
    }

    #[test]
    fn exists_tracks_retained_uninstall() {
        let (device, inventory) = inventory(vec![
            DevicePackage::new("keep", "Keep").with_launcher(),
            DevicePackage::new("drop", "Drop").with_launcher(),
        ]);
        assert!(inventory.exists("keep"));

        device.uninstall("keep", true);
        device.uninstall("drop", false);
        assert!(inventory.exists("keep"));
        assert!(!inventory.exists("drop"));
        assert!(!inventory.exists("never.installed"));
    }

    #[test]
    fn exists_drops_immediately_before_retention() {
        let device = Arc::new(MemoryDevice::from_fixture(DeviceFixture {
            sdk_int: 23,
            ..DeviceFixture::default()
        }));
        device.install(DevicePackage::new("keep", "Keep").with_launcher());
        let inventory = AppInventory::new(device.clone());
        assert!(inventory.exists("keep"));

        device.uninstall("keep", true);
        assert!(!inventory.exists("keep"));
    }

    #[test]
    fn failing_query_fails_enumeration() {
        let (device, inventory) = inventory(vec![DevicePackage::new("a", "A").with_leanback()]);
        device.set_fail_queries(true);
        assert!(inventory.applications().is_err());
    }
}
