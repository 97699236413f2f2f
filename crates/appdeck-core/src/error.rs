// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Appdeck.

use thiserror::Error;

/// Top-level error type for all Appdeck operations.
#[derive(Debug, Error)]
pub enum LauncherError {
    // -- Package manager --
    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("no activity found to handle {0}")]
    ActivityNotFound(String),

    // -- Rendering --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Call channel --
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl LauncherError {
    /// Programmer errors on the call channel. These are surfaced to the UI
    /// layer instead of being folded into a `false` result.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::UnknownMethod(_) | Self::InvalidArgument(_))
    }

    /// Whether the platform reported the package (or an activity for it) as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PackageNotFound(_) | Self::ActivityNotFound(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LauncherError>;
