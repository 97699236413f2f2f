// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Appdeck inventory bridge.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::{CATEGORY_LAUNCHER, CATEGORY_LEANBACK_LAUNCHER};

/// One launchable application as delivered to the UI layer.
///
/// Field names are the stable contract with the UI decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub name: String,
    pub package_name: String,
    /// PNG-encoded banner (TV artwork), absent if the app has none.
    pub banner: Option<Vec<u8>>,
    /// PNG-encoded launcher icon.
    pub icon: Option<Vec<u8>>,
    /// `versionName` from the package metadata. Packages may omit it.
    pub version: Option<String>,
    /// True when the app has no leanback entry point.
    pub sideloaded: bool,
}

/// Push-channel record, tagged by `action`.
///
/// The payload keys (`activitiyInfo`, `activitiesInfo`) are what the UI layer
/// already decodes, spelling included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageEvent {
    PackageRemoved {
        #[serde(rename = "packageName")]
        package_name: String,
    },
    PackageAdded {
        #[serde(rename = "activitiyInfo")]
        app: AppRecord,
    },
    PackageChanged {
        #[serde(rename = "activitiyInfo")]
        app: AppRecord,
    },
    /// Batch after an update or external-storage remount. Entries that no
    /// longer resolve to a launchable app are `None`.
    PackagesAvailable {
        #[serde(rename = "activitiesInfo")]
        apps: Vec<Option<AppRecord>>,
    },
}

impl PackageEvent {
    /// Wire name of the variant.
    pub fn action(&self) -> &'static str {
        match self {
            Self::PackageRemoved { .. } => "PACKAGE_REMOVED",
            Self::PackageAdded { .. } => "PACKAGE_ADDED",
            Self::PackageChanged { .. } => "PACKAGE_CHANGED",
            Self::PackagesAvailable { .. } => "PACKAGES_AVAILABLE",
        }
    }
}

/// Launcher category an entry point was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchCategory {
    /// 10-foot UI entry point (`LEANBACK_LAUNCHER`).
    Leanback,
    /// Phone/tablet entry point (`LAUNCHER`).
    Launcher,
}

impl LaunchCategory {
    /// Lookup order: leanback wins over the general launcher.
    pub const PRIORITY: [LaunchCategory; 2] = [LaunchCategory::Leanback, LaunchCategory::Launcher];

    pub fn intent_category(self) -> &'static str {
        match self {
            Self::Leanback => CATEGORY_LEANBACK_LAUNCHER,
            Self::Launcher => CATEGORY_LAUNCHER,
        }
    }

    /// Apps reachable only through the general launcher count as sideloaded.
    pub fn sideloaded(self) -> bool {
        matches!(self, Self::Launcher)
    }
}

/// Activity metadata returned by intent queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub package_name: String,
    /// Fully-qualified activity class.
    pub name: String,
}

impl ActivityInfo {
    pub fn new(package_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            name: name.into(),
        }
    }
}

/// Subset of `ApplicationInfo` the bridge inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub package_name: String,
    /// False for packages uninstalled with "keep data" that the platform still reports.
    pub installed: bool,
}

/// `PackageManager` lookup flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageFlags(pub u32);

impl PackageFlags {
    pub const NONE: PackageFlags = PackageFlags(0);
    /// `GET_UNINSTALLED_PACKAGES`, deprecated in API 24.
    pub const GET_UNINSTALLED_PACKAGES: PackageFlags = PackageFlags(0x0000_2000);
    /// `MATCH_UNINSTALLED_PACKAGES`, API 24+.
    pub const MATCH_UNINSTALLED_PACKAGES: PackageFlags = PackageFlags(0x0000_2000);

    /// API level that introduced `MATCH_UNINSTALLED_PACKAGES`.
    pub const MATCH_UNINSTALLED_MIN_SDK: u32 = 24;

    /// The "include uninstalled-but-retained packages" flag for an API level.
    pub fn uninstalled_for_sdk(sdk_int: u32) -> Self {
        if sdk_int >= Self::MATCH_UNINSTALLED_MIN_SDK {
            Self::MATCH_UNINSTALLED_PACKAGES
        } else {
            Self::GET_UNINSTALLED_PACKAGES
        }
    }

    pub fn includes_uninstalled(self) -> bool {
        self.0 & Self::MATCH_UNINSTALLED_PACKAGES.0 != 0
    }
}

/// Rasterized drawable in RGBA8, as handed over by the platform.
///
/// Width and height are the drawable's intrinsic size, which may be zero or
/// negative for colour drawables; `pixels` is empty in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawable {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub pixels: Vec<u8>,
}

impl Drawable {
    /// A drawable filled with one colour.
    pub fn solid(width: i32, height: i32, rgba: [u8; 4]) -> Self {
        let count = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            pixels: rgba.repeat(count),
        }
    }

    pub fn has_intrinsic_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Identity of one event-stream subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SubscriptionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Handle for a callback registered with the platform package service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallbackId(pub u64);
