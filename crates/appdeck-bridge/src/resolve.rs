// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Launch-intent resolution: leanback entry point first, general launcher second.

use appdeck_core::error::Result;
use appdeck_core::{Intent, LaunchCategory};

use crate::traits::PackageService;

/// Outcome of looking up a package's launch entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchResolution {
    /// Package has a 10-foot UI entry point.
    Leanback(Intent),
    /// Package only has a phone/tablet entry point.
    General(Intent),
    /// Package has no launchable activity (or no longer exists).
    NotLaunchable,
}

impl LaunchResolution {
    /// Try each category in priority order and stop at the first hit.
    pub fn lookup(service: &dyn PackageService, package_name: &str) -> Result<Self> {
        for category in LaunchCategory::PRIORITY {
            if let Some(intent) = service.launch_intent_for_package(package_name, category)? {
                return Ok(Self::found(category, intent));
            }
        }
        Ok(Self::NotLaunchable)
    }

    fn found(category: LaunchCategory, intent: Intent) -> Self {
        match category {
            LaunchCategory::Leanback => Self::Leanback(intent),
            LaunchCategory::Launcher => Self::General(intent),
        }
    }

    pub fn intent(&self) -> Option<&Intent> {
        match self {
            Self::Leanback(intent) | Self::General(intent) => Some(intent),
            Self::NotLaunchable => None,
        }
    }

    pub fn into_intent(self) -> Option<Intent> {
        match self {
            Self::Leanback(intent) | Self::General(intent) => Some(intent),
            Self::NotLaunchable => None,
        }
    }

    /// `None` when nothing resolved.
    pub fn sideloaded(&self) -> Option<bool> {
        match self {
            Self::Leanback(_) => Some(false),
            Self::General(_) => Some(true),
            Self::NotLaunchable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DevicePackage, MemoryDevice};

    #[test]
    fn leanback_entry_wins() {
        let device = MemoryDevice::new();
        device.install(DevicePackage::new("com.tv", "TV").with_leanback().with_launcher());
        let res = LaunchResolution::lookup(&device, "com.tv").expect("lookup");
        assert!(matches!(res, LaunchResolution::Leanback(_)));
        assert_eq!(res.sideloaded(), Some(false));
    }

    #[test]
    fn falls_back_to_general_launcher() {
        let device = MemoryDevice::new();
        device.install(DevicePackage::new("com.phone", "Phone").with_launcher());
        let res = LaunchResolution::lookup(&device, "com.phone").expect("lookup");
        assert!(matches!(res, LaunchResolution::General(_)));
        assert_eq!(res.sideloaded(), Some(true));
    }

    #[test]
    fn service_without_entry_points_is_not_launchable() {
        let device = MemoryDevice::new();
        device.install(DevicePackage::new("com.service", "Background"));
        let res = LaunchResolution::lookup(&device, "com.service").expect("lookup");
        assert_eq!(res, LaunchResolution::NotLaunchable);
        assert!(res.intent().is_none());
    }
}
