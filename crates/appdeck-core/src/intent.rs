// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform intent model. Mirrors the subset of `android.content.Intent` the
// bridge dispatches; backends translate it into the real platform object.

use serde::{Deserialize, Serialize};

pub const ACTION_MAIN: &str = "android.intent.action.MAIN";
pub const ACTION_DELETE: &str = "android.intent.action.DELETE";
pub const ACTION_GET_CONTENT: &str = "android.intent.action.GET_CONTENT";
pub const ACTION_SETTINGS: &str = "android.settings.SETTINGS";
pub const ACTION_APPLICATION_DETAILS_SETTINGS: &str =
    "android.settings.APPLICATION_DETAILS_SETTINGS";

pub const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";
pub const CATEGORY_LEANBACK_LAUNCHER: &str = "android.intent.category.LEANBACK_LAUNCHER";
pub const CATEGORY_HOME: &str = "android.intent.category.HOME";

/// `Intent.FLAG_ACTIVITY_NEW_TASK`; set on every platform launch intent.
pub const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;

/// Fully-qualified activity identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentName {
    pub package: String,
    pub class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }
}

/// Opaque-ish URI limited to the `scheme:ssp` form built by `Uri.fromParts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uri {
    pub scheme: String,
    pub scheme_specific_part: String,
}

impl Uri {
    /// `package:<name>` URI used by the details and delete actions.
    pub fn package(package_name: &str) -> Self {
        Self {
            scheme: "package".into(),
            scheme_specific_part: package_name.into(),
        }
    }
}

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scheme, self.scheme_specific_part)
    }
}

/// Description of an activity to start or query for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Intent {
    pub action: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub data: Option<Uri>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub component: Option<ComponentName>,
    /// `Intent.getFlags()` bits, passed through to the platform unchanged.
    #[serde(default)]
    pub flags: i32,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn add_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn set_data(mut self, data: Uri) -> Self {
        self.data = Some(data);
        self
    }

    /// Same normalisation as `Intent.setTypeAndNormalize`: lower-cased, parameters stripped.
    pub fn set_type_and_normalize(mut self, mime_type: &str) -> Self {
        let base = mime_type.split(';').next().unwrap_or_default().trim();
        self.mime_type = Some(base.to_ascii_lowercase());
        self
    }

    pub fn set_component(mut self, component: ComponentName) -> Self {
        self.component = Some(component);
        self
    }

    pub fn add_flags(mut self, flags: i32) -> Self {
        self.flags |= flags;
        self
    }

    pub fn has_flags(&self, flags: i32) -> bool {
        self.flags & flags == flags
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    // -- Named constructors for every intent the bridge dispatches ------------

    /// `ACTION_MAIN` restricted to one launcher category.
    pub fn launcher_query(category: &str) -> Self {
        Self::new(ACTION_MAIN).add_category(category)
    }

    /// What `getLaunchIntentForPackage` hands back for a component.
    pub fn launch(category: &str, component: ComponentName) -> Self {
        Self::launcher_query(category)
            .set_component(component)
            .add_flags(FLAG_ACTIVITY_NEW_TASK)
    }

    /// Root of the system settings app.
    pub fn settings() -> Self {
        Self::new(ACTION_SETTINGS)
    }

    /// App-info page for one package.
    pub fn app_details(package_name: &str) -> Self {
        Self::new(ACTION_APPLICATION_DETAILS_SETTINGS).set_data(Uri::package(package_name))
    }

    /// System uninstall prompt for one package.
    pub fn delete_package(package_name: &str) -> Self {
        Self::new(ACTION_DELETE).set_data(Uri::package(package_name))
    }

    /// Query for whoever currently owns the home role.
    pub fn home() -> Self {
        Self::new(ACTION_MAIN).add_category(CATEGORY_HOME)
    }

    /// Content picker query for the given MIME type.
    pub fn get_content(mime_type: &str) -> Self {
        Self::new(ACTION_GET_CONTENT).set_type_and_normalize(mime_type)
    }

    /// Explicit `ACTION_MAIN` for a known component.
    pub fn main_component(component: ComponentName) -> Self {
        Self::new(ACTION_MAIN).set_component(component)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Intent {{ act={}", self.action)?;
        if !self.categories.is_empty() {
            write!(f, " cat=[{}]", self.categories.join(","))?;
        }
        if let Some(data) = &self.data {
            write!(f, " dat={data}")?;
        }
        if let Some(mime) = &self.mime_type {
            write!(f, " typ={mime}")?;
        }
        if let Some(cmp) = &self.component {
            write!(f, " cmp={}/{}", cmp.package, cmp.class)?;
        }
        if self.flags != 0 {
            write!(f, " flg={:#x}", self.flags)?;
        }
        write!(f, " }}")
    }
}
