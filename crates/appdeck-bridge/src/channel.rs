// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Call-channel vocabulary: method names, argument decoding, result encoding.

use std::str::FromStr;

use appdeck_core::AppRecord;
use appdeck_core::error::{LauncherError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every method the UI layer may invoke on the call channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetApplications,
    ApplicationExists,
    LaunchApp,
    OpenSettings,
    OpenAppInfo,
    UninstallApp,
    IsDefaultLauncher,
    CheckForGetContentAvailability,
    StartAmbientMode,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::GetApplications,
        Method::ApplicationExists,
        Method::LaunchApp,
        Method::OpenSettings,
        Method::OpenAppInfo,
        Method::UninstallApp,
        Method::IsDefaultLauncher,
        Method::CheckForGetContentAvailability,
        Method::StartAmbientMode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GetApplications => "getApplications",
            Self::ApplicationExists => "applicationExists",
            Self::LaunchApp => "launchApp",
            Self::OpenSettings => "openSettings",
            Self::OpenAppInfo => "openAppInfo",
            Self::UninstallApp => "uninstallApp",
            Self::IsDefaultLauncher => "isDefaultLauncher",
            Self::CheckForGetContentAvailability => "checkForGetContentAvailability",
            Self::StartAmbientMode => "startAmbientMode",
        }
    }

    /// Methods whose argument is a package id.
    pub fn takes_package(self) -> bool {
        matches!(
            self,
            Self::ApplicationExists | Self::LaunchApp | Self::OpenAppInfo | Self::UninstallApp
        )
    }
}

impl FromStr for Method {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| LauncherError::UnknownMethod(s.into()))
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One request as it arrives on the call channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Call whose argument is a package id.
    pub fn with_package(method: impl Into<String>, package_name: &str) -> Self {
        Self::new(method, Value::String(package_name.into()))
    }

    pub fn parse_method(&self) -> Result<Method> {
        self.method.parse()
    }

    /// The package-id argument. Anything other than a string is a caller bug.
    pub fn package_argument(&self) -> Result<&str> {
        self.arguments.as_str().ok_or_else(|| {
            LauncherError::InvalidArgument(format!(
                "{} expects a package name string, got {}",
                self.method, self.arguments
            ))
        })
    }
}

/// Successful result of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MethodResponse {
    Applications(Vec<AppRecord>),
    Flag(bool),
}

impl MethodResponse {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Applications(_) => None,
        }
    }

    pub fn into_applications(self) -> Option<Vec<AppRecord>> {
        match self {
            Self::Applications(apps) => Some(apps),
            Self::Flag(_) => None,
        }
    }
}
