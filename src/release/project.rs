//! Resolved project descriptor.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// An Xcode project resolved once per invocation.
///
/// Built by [`crate::metadata::resolve_project`] and never mutated by the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    name: String,
    root: PathBuf,
    project_path: PathBuf,
    scheme: String,
}

impl ProjectDescriptor {
    /// Creates a descriptor from already resolved parts.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        project_path: impl Into<PathBuf>,
        scheme: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            project_path: project_path.into(),
            scheme: scheme.into(),
        }
    }

    /// Product name, also the `.app` stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checkout root that detection scans.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.xcodeproj` bundle.
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Build scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// File name of the built bundle, e.g. `Demo.app`.
    pub fn app_file_name(&self) -> String {
        format!("{}.app", self.name)
    }

    /// File name of the disk image, e.g. `Demo.dmg`.
    pub fn dmg_file_name(&self) -> String {
        format!("{}.dmg", self.name)
    }
}
