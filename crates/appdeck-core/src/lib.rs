// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Appdeck core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod intent;
pub mod types;

pub use config::BridgeConfig;
pub use error::LauncherError;
pub use intent::{ComponentName, Intent};
pub use types::*;
