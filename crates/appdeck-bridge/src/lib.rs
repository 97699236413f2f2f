// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Appdeck application inventory bridge.
//!
//! Translates call-channel requests from the launcher UI into package
//! manager and activity calls, and forwards package add/remove/change
//! notifications onto the push channel. The platform itself sits behind
//! [`traits::PackageService`] so the same bridge runs on a device (JNI),
//! on the desktop (stub) and in tests (in-memory device).

pub mod actions;
pub mod bridge;
pub mod channel;
pub mod events;
pub mod inventory;
pub mod memory;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use std::sync::Arc;

pub use bridge::LauncherBridge;
pub use channel::{Method, MethodCall, MethodResponse};
pub use traits::{EventSink, PackageCallback, PackageService};

/// Package service for the target operating system.
pub fn platform_service() -> Arc<dyn PackageService> {
    #[cfg(target_os = "android")]
    {
        // Android: `jni-rs` calls into PackageManager / LauncherApps.
        Arc::new(android::AndroidPackageService::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: every platform call reports PlatformUnavailable.
        Arc::new(stub::StubPackageService)
    }
}
