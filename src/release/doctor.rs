//! Project diagnostics and scaffolding.
//!
//! [`diagnose`] reports what a release would be missing. [`fix`] writes
//! default entitlements and an Info manifest next to the project and points
//! the project's build settings at them.

use handlebars::Handlebars;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::release::{
    error::{ErrorExt, Result},
    pipeline::{PipelineDecision, UPDATER_ENTITLEMENTS_FILE, locate_entitlements, locate_info_manifest},
    project::ProjectDescriptor,
    tools,
};

const APP_ENTITLEMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>com.apple.security.app-sandbox</key>
  <true/>
  <key>com.apple.security.files.user-selected.read-only</key>
  <true/>
  <key>com.apple.security.network.client</key>
  <true/>
</dict>
</plist>
"#;

const UPDATER_ENTITLEMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>com.apple.security.app-sandbox</key>
  <true/>
  <key>com.apple.security.network.client</key>
  <true/>
</dict>
</plist>
"#;

const INFO_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>CFBundleDisplayName</key>
  <string>{{app_name}}</string>
  <key>CFBundleExecutable</key>
  <string>$(EXECUTABLE_NAME)</string>
  <key>CFBundleIdentifier</key>
  <string>$(PRODUCT_BUNDLE_IDENTIFIER)</string>
  <key>CFBundleName</key>
  <string>$(PRODUCT_NAME)</string>
  <key>CFBundlePackageType</key>
  <string>APPL</string>
  <key>CFBundleShortVersionString</key>
  <string>$(MARKETING_VERSION)</string>
  <key>CFBundleVersion</key>
  <string>$(CURRENT_PROJECT_VERSION)</string>
  <key>LSApplicationCategoryType</key>
  <string>public.app-category.utilities</string>
  <key>LSMinimumSystemVersion</key>
  <string>$(MACOSX_DEPLOYMENT_TARGET)</string>
  <key>NSPrincipalClass</key>
  <string>NSApplication</string>
</dict>
</plist>
"#;

/// Findings for one project.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub project_path: PathBuf,
    pub missing_entitlements: bool,
    pub missing_updater_entitlements: bool,
    pub info_manifest: Option<PathBuf>,
    pub feed_markers: bool,
    pub updater_tools_found: bool,
    pub missing_tools: Vec<&'static str>,
}

impl DoctorReport {
    /// Human readable warnings, empty when nothing needs attention.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.missing_entitlements {
            warnings.push("Missing app entitlements. Run `appship doctor --fix`.".to_string());
        }
        if self.missing_updater_entitlements {
            warnings.push(format!(
                "Update feed enabled but {UPDATER_ENTITLEMENTS_FILE} is missing. Run `appship doctor --fix`."
            ));
        }
        if self.info_manifest.is_none() {
            warnings.push("No Info.plist found; the update feed stays disabled.".to_string());
        }
        if self.feed_markers && !self.updater_tools_found {
            warnings.push(
                "Info.plist declares an update feed but sign_update/generate_appcast were not found. Set SPARKLE_BIN."
                    .to_string(),
            );
        }
        for tool in &self.missing_tools {
            warnings.push(format!("{tool} not found in PATH."));
        }
        warnings
    }
}

/// Summarizes `decision` and checks for external tools.
pub fn diagnose(project: &ProjectDescriptor, decision: &PipelineDecision) -> DoctorReport {
    DoctorReport {
        project_path: project.project_path().to_path_buf(),
        missing_entitlements: decision.entitlements_path.is_none(),
        missing_updater_entitlements: decision.feed_enabled
            && decision.updater_entitlements_path.is_none(),
        info_manifest: decision.info_manifest_path.clone(),
        feed_markers: decision.feed_markers,
        updater_tools_found: decision.updater_tools.is_some(),
        missing_tools: tools::missing_tools(),
    }
}

/// Files written and whether the project file changed.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub created: Vec<PathBuf>,
    pub project_updated: bool,
}

/// Scaffolds missing files and wires them into the project's build settings.
///
/// Existing files are never overwritten.
pub fn fix(project: &ProjectDescriptor) -> Result<FixOutcome> {
    let mut outcome = FixOutcome::default();
    let resources = resources_dir(project)?;

    let entitlements = resources.join(format!("{}.entitlements", project.name()));
    if write_if_absent(&entitlements, APP_ENTITLEMENTS)? {
        outcome.created.push(entitlements.clone());
    }

    let updater_entitlements = resources.join(UPDATER_ENTITLEMENTS_FILE);
    if write_if_absent(&updater_entitlements, UPDATER_ENTITLEMENTS)? {
        outcome.created.push(updater_entitlements);
    }

    let info_manifest = match locate_info_manifest(project.root(), &[])? {
        Some(existing) => existing,
        None => {
            let created = resources.join("Info.plist");
            write_if_absent(&created, &render_info_manifest(project.name())?)?;
            outcome.created.push(created.clone());
            created
        }
    };

    outcome.project_updated = update_project_file(project.project_path(), &entitlements, &info_manifest)?;

    let expected = format!("{}.entitlements", project.name());
    if locate_entitlements(project.root(), &expected, &[])?.is_none() {
        log::warn!("Entitlements still missing; update CODE_SIGN_ENTITLEMENTS manually.");
    }

    Ok(outcome)
}

/// Default Info manifest for `app_name`.
pub fn render_info_manifest(app_name: &str) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    Ok(registry.render_template(INFO_MANIFEST, &json!({ "app_name": app_name }))?)
}

fn write_if_absent(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, content).fs_context("writing", path)?;
    log::info!("Created {}", path.display());
    Ok(true)
}

fn resources_dir(project: &ProjectDescriptor) -> Result<PathBuf> {
    let candidates = [
        project.root().join("Resources"),
        project.root().join(project.name()).join("Resources"),
    ];
    if let Some(existing) = candidates.iter().find(|c| c.is_dir()) {
        return Ok(existing.clone());
    }
    fs::create_dir_all(&candidates[0]).fs_context("creating directory", &candidates[0])?;
    Ok(candidates[0].clone())
}

/// Points `CODE_SIGN_ENTITLEMENTS` and `INFOPLIST_FILE` at the given files
/// and turns off Info.plist generation. Returns whether the file changed.
pub fn update_project_file(project_path: &Path, entitlements: &Path, info_manifest: &Path) -> Result<bool> {
    let pbxproj = project_path.join("project.pbxproj");
    if !pbxproj.is_file() {
        return Ok(false);
    }

    let original = fs::read_to_string(&pbxproj).fs_context("reading", &pbxproj)?;
    let project_dir = project_path.parent().unwrap_or(project_path);
    let mut content = original.clone();

    if !has_setting(&content, "CODE_SIGN_ENTITLEMENTS")? {
        let value = relative_to(project_dir, entitlements);
        content = inject_build_setting(&content, "CODE_SIGN_ENTITLEMENTS", &value)?;
    }
    if !has_setting(&content, "INFOPLIST_FILE")? {
        let value = relative_to(project_dir, info_manifest);
        content = inject_build_setting(&content, "INFOPLIST_FILE", &value)?;
    }
    content = content.replace("GENERATE_INFOPLIST_FILE = YES;", "GENERATE_INFOPLIST_FILE = NO;");

    if content == original {
        return Ok(false);
    }
    fs::write(&pbxproj, content).fs_context("writing", &pbxproj)?;
    log::info!("Updated project build settings in {}", pbxproj.display());
    Ok(true)
}

fn has_setting(content: &str, key: &str) -> Result<bool> {
    Ok(Regex::new(&format!(r"\b{key}\s*="))?.is_match(content))
}

fn relative_to(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Adds `key = value;` after each `INFOPLIST_FILE`, else each
/// `PRODUCT_BUNDLE_IDENTIFIER`, else at the top of each `buildSettings` block.
pub fn inject_build_setting(content: &str, key: &str, value: &str) -> Result<String> {
    let line = format!("\n\t\t\t\t{key} = {value};");
    for anchor in [
        r"(\bINFOPLIST_FILE\s*=\s*[^;]+;)",
        r"(\bPRODUCT_BUNDLE_IDENTIFIER\s*=\s*[^;]+;)",
    ] {
        let pattern = Regex::new(anchor)?;
        if pattern.is_match(content) {
            return Ok(pattern
                .replace_all(content, |caps: &regex::Captures<'_>| format!("{}{}", &caps[1], line))
                .into_owned());
        }
    }
    Ok(content.replace(
        "\t\t\t\tbuildSettings = {",
        &format!("\t\t\t\tbuildSettings = {{{line}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_after_bundle_identifier() {
        let content = "\t\t\t\tbuildSettings = {\n\t\t\t\tPRODUCT_BUNDLE_IDENTIFIER = com.example.demo;\n\t\t\t};";
        let updated = inject_build_setting(content, "CODE_SIGN_ENTITLEMENTS", "Resources/Demo.entitlements").unwrap();
        assert!(updated.contains(
            "PRODUCT_BUNDLE_IDENTIFIER = com.example.demo;\n\t\t\t\tCODE_SIGN_ENTITLEMENTS = Resources/Demo.entitlements;"
        ));
    }

    #[test]
    fn generated_plist_setting_is_not_an_anchor() {
        let content = "\t\t\t\tbuildSettings = {\n\t\t\t\tGENERATE_INFOPLIST_FILE = YES;\n\t\t\t};";
        assert!(!has_setting(content, "INFOPLIST_FILE").unwrap());
        let updated = inject_build_setting(content, "INFOPLIST_FILE", "Info.plist").unwrap();
        assert!(updated.contains("buildSettings = {\n\t\t\t\tINFOPLIST_FILE = Info.plist;"));
    }

    #[test]
    fn falls_back_to_build_settings_block() {
        let content = "\t\t\t\tbuildSettings = {\n\t\t\t};";
        let updated = inject_build_setting(content, "INFOPLIST_FILE", "Resources/Info.plist").unwrap();
        assert!(updated.starts_with("\t\t\t\tbuildSettings = {\n\t\t\t\tINFOPLIST_FILE = Resources/Info.plist;"));
    }

    #[test]
    fn info_manifest_escapes_app_name() {
        let rendered = render_info_manifest("Tom & Jerry").unwrap();
        assert!(rendered.contains("<string>Tom &amp; Jerry</string>"));
        assert!(rendered.contains("$(PRODUCT_BUNDLE_IDENTIFIER)"));
    }
}
