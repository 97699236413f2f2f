// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LauncherError, Result};
use crate::intent::ComponentName;

/// Application id the launcher ships under.
pub const DEFAULT_APPLICATION_ID: &str = "app.appdeck.launcher";

/// Settings for one bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Package id of the launcher itself; prefixes both channel names.
    pub application_id: String,
    /// Call channel name. Derived from `application_id` when empty.
    #[serde(default)]
    pub method_channel: String,
    /// Push channel name. Derived from `application_id` when empty.
    #[serde(default)]
    pub event_channel: String,
    /// Activity started by `startAmbientMode` (the system screensaver).
    pub ambient_component: ComponentName,
    /// MIME type probed by `checkForGetContentAvailability`.
    pub content_mime_type: String,
}

impl BridgeConfig {
    /// Build a config for another application id with derived channel names.
    pub fn for_application(application_id: impl Into<String>) -> Self {
        let mut config = Self {
            application_id: application_id.into(),
            method_channel: String::new(),
            event_channel: String::new(),
            ..Self::default()
        };
        config.fill_channel_names();
        config
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.fill_channel_names();
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    fn fill_channel_names(&mut self) {
        if self.method_channel.is_empty() {
            self.method_channel = format!("{}/method", self.application_id);
        }
        if self.event_channel.is_empty() {
            self.event_channel = format!("{}/event", self.application_id);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.application_id.trim().is_empty() {
            return Err(LauncherError::Config("application_id must not be empty".into()));
        }
        if self.method_channel == self.event_channel {
            return Err(LauncherError::Config(format!(
                "method and event channels share the name {}",
                self.method_channel
            )));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut config = Self {
            application_id: DEFAULT_APPLICATION_ID.into(),
            method_channel: String::new(),
            event_channel: String::new(),
            ambient_component: ComponentName::new(
                "com.android.systemui",
                "com.android.systemui.Somnambulator",
            ),
            content_mime_type: "image/*".into(),
        };
        config.fill_channel_names();
        config
    }
}
