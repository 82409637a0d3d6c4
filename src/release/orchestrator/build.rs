//! Archive build, export and staging.

use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::release::{
    error::{Error, Result},
    pipeline::Stage,
    project::ProjectDescriptor,
    tools::{Invocation, ToolRunner, run_stage},
    utils::fs,
};

const CONFIGURATION: &str = "Release";
const DESTINATION: &str = "generic/platform=macOS";

/// `xcodebuild archive` arguments with manual signing by `identity`.
pub fn archive_args(
    project: &ProjectDescriptor,
    derived_data: &Path,
    archive_path: &Path,
    identity: &str,
) -> Vec<OsString> {
    vec![
        "-project".into(),
        project.project_path().into(),
        "-scheme".into(),
        project.scheme().into(),
        "-configuration".into(),
        CONFIGURATION.into(),
        "-derivedDataPath".into(),
        derived_data.into(),
        "-destination".into(),
        DESTINATION.into(),
        "-archivePath".into(),
        archive_path.into(),
        format!("CODE_SIGN_IDENTITY={identity}").into(),
        "CODE_SIGN_STYLE=Manual".into(),
        "archive".into(),
    ]
}

/// `xcodebuild -exportArchive` arguments.
pub fn export_args(archive_path: &Path, export_dir: &Path, options_plist: &Path) -> Vec<OsString> {
    vec![
        "-exportArchive".into(),
        "-archivePath".into(),
        archive_path.into(),
        "-exportPath".into(),
        export_dir.into(),
        "-exportOptionsPlist".into(),
        options_plist.into(),
    ]
}

/// Asks the build tool for `PRODUCT_BUNDLE_IDENTIFIER`.
///
/// Any failure yields `None`; entitlements are then used without substitution.
pub fn resolve_bundle_identifier<R: ToolRunner + ?Sized>(
    runner: &R,
    project: &ProjectDescriptor,
) -> Option<String> {
    let invocation = Invocation::new("xcodebuild")
        .arg("-project")
        .arg(project.project_path())
        .args(["-scheme", project.scheme(), "-configuration", CONFIGURATION])
        .arg("-showBuildSettings")
        .quiet();

    let output = match runner.run(&invocation) {
        Ok(output) if output.is_success() => output,
        Ok(output) => {
            log::debug!("Build settings query exited with {:?}", output.code);
            return None;
        }
        Err(e) => {
            log::debug!("Build settings query could not run: {}", e);
            return None;
        }
    };

    let pattern = Regex::new(r"(?m)^\s*PRODUCT_BUNDLE_IDENTIFIER\s*=\s*(.+?)\s*$").ok()?;
    pattern
        .captures(&output.stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Paths the build stages produce inside the build directory.
#[derive(Debug, Clone)]
pub struct BuildLayout {
    pub derived_data: PathBuf,
    pub archive: PathBuf,
    pub export_dir: PathBuf,
    pub app: PathBuf,
    pub app_zip: PathBuf,
    pub dmg: PathBuf,
    pub dmg_staging: PathBuf,
}

impl BuildLayout {
    pub fn new(project: &ProjectDescriptor, build_dir: &Path) -> Self {
        Self {
            derived_data: build_dir.join("DerivedData"),
            archive: build_dir.join(format!("{}.xcarchive", project.name())),
            export_dir: build_dir.join("export"),
            app: build_dir.join(project.app_file_name()),
            app_zip: build_dir.join(format!("{}.zip", project.name())),
            dmg: build_dir.join(project.dmg_file_name()),
            dmg_staging: build_dir.join("dmg"),
        }
    }
}

/// Archives the scheme and exports it with `options_plist`.
///
/// Returns the exported `.app` path.
pub fn archive_and_export<R: ToolRunner + ?Sized>(
    runner: &R,
    project: &ProjectDescriptor,
    layout: &BuildLayout,
    identity: &str,
    options_plist: &Path,
) -> Result<PathBuf> {
    log::info!("Archiving {} ({})...", project.name(), project.scheme());
    fs::remove_dir_all(&layout.archive)?;
    let archive = Invocation::new("xcodebuild").args(archive_args(
        project,
        &layout.derived_data,
        &layout.archive,
        identity,
    ));
    run_stage(runner, Stage::Build, &archive)?;
    log::info!("✓ Archived {}", layout.archive.display());

    log::info!("Exporting archive...");
    fs::create_dir_all(&layout.export_dir, true)?;
    let export = Invocation::new("xcodebuild").args(export_args(
        &layout.archive,
        &layout.export_dir,
        options_plist,
    ));
    run_stage(runner, Stage::Export, &export)?;

    let exported = layout.export_dir.join(project.app_file_name());
    if !exported.is_dir() {
        return Err(Error::ToolFailed {
            stage: Stage::Export,
            command: export.to_string(),
            status: "exit code 0".to_string(),
            output: format!("exported app not found at {}", exported.display()),
        });
    }
    Ok(exported)
}

/// Replaces the staged bundle with `built` and clears stale derived artifacts.
pub fn stage_app(built: &Path, layout: &BuildLayout) -> Result<()> {
    fs::remove_dir_all(&layout.app)?;
    fs::remove_file(&layout.dmg)?;
    fs::remove_file(&layout.app_zip)?;
    fs::copy_dir(built, &layout.app)?;
    log::info!("✓ Staged {}", layout.app.display());
    Ok(())
}
