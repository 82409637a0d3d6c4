//! Code signing of the bundle, its updater helpers and the disk image.

use std::path::{Path, PathBuf};

use crate::release::{
    error::{Error, Result},
    pipeline::Stage,
    tools::{Invocation, ToolRunner, run_stage},
};

/// Embedded updater framework, relative to the bundle.
pub const UPDATER_FRAMEWORK: &str = "Contents/Frameworks/Sparkle.framework";

/// Nested updater code, innermost first, relative to the framework.
const UPDATER_HELPERS: &[&str] = &[
    "Versions/B/XPCServices/Installer.xpc",
    "Versions/B/XPCServices/Downloader.xpc",
    "Versions/B/Autoupdate",
    "Versions/B/Updater.app",
];

/// Helper paths present inside `app`, in signing order, framework last.
pub fn updater_helpers(app: &Path) -> Vec<PathBuf> {
    let framework = app.join(UPDATER_FRAMEWORK);
    if !framework.is_dir() {
        return Vec::new();
    }
    let mut helpers: Vec<PathBuf> = UPDATER_HELPERS
        .iter()
        .map(|rel| framework.join(rel))
        .filter(|p| p.exists())
        .collect();
    helpers.push(framework);
    helpers
}

fn codesign_runtime(identity: &str, entitlements: Option<&Path>, target: &Path) -> Invocation {
    let invocation = Invocation::new("codesign").args([
        "--force",
        "--options",
        "runtime",
        "--timestamp",
        "--sign",
        identity,
    ]);
    let invocation = match entitlements {
        Some(path) => invocation.arg("--entitlements").arg(path),
        None => invocation,
    };
    invocation.arg(target)
}

/// Signs embedded updater helpers with the narrower entitlement set.
///
/// Runs before [`sign_app`] so the outer seal covers already signed code.
pub fn sign_updater_helpers<R: ToolRunner + ?Sized>(
    runner: &R,
    app: &Path,
    identity: &str,
    entitlements: Option<&Path>,
) -> Result<usize> {
    let helpers = updater_helpers(app);
    for helper in &helpers {
        log::debug!("Signing updater helper {}", helper.display());
        run_stage(runner, Stage::Sign, &codesign_runtime(identity, entitlements, helper))?;
    }
    if !helpers.is_empty() {
        log::info!("✓ Signed {} updater helpers", helpers.len());
    }
    Ok(helpers.len())
}

/// Signs the bundle with the hardened runtime and its entitlements.
pub fn sign_app<R: ToolRunner + ?Sized>(
    runner: &R,
    app: &Path,
    identity: &str,
    entitlements: Option<&Path>,
) -> Result<()> {
    let entitlements = entitlements.ok_or_else(|| Error::config("missing app entitlements"))?;
    log::info!("Signing {}...", app.display());
    run_stage(runner, Stage::Sign, &codesign_runtime(identity, Some(entitlements), app))?;
    log::info!("✓ Signed {}", app.display());
    Ok(())
}

/// Signs the disk image container itself.
pub fn sign_dmg<R: ToolRunner + ?Sized>(runner: &R, dmg: &Path, identity: &str) -> Result<()> {
    let invocation = Invocation::new("codesign")
        .args(["--force", "--timestamp", "--sign", identity])
        .arg(dmg);
    run_stage(runner, Stage::DiskImage, &invocation)?;
    log::info!("✓ Signed {}", dmg.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn helpers_are_listed_innermost_first_with_framework_last() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("Demo.app");
        let framework = app.join(UPDATER_FRAMEWORK);
        fs::create_dir_all(framework.join("Versions/B/XPCServices/Downloader.xpc")).unwrap();
        fs::create_dir_all(framework.join("Versions/B/Updater.app")).unwrap();
        fs::write(framework.join("Versions/B/Autoupdate"), "bin").unwrap();

        assert_eq!(
            updater_helpers(&app),
            vec![
                framework.join("Versions/B/XPCServices/Downloader.xpc"),
                framework.join("Versions/B/Autoupdate"),
                framework.join("Versions/B/Updater.app"),
                framework.clone(),
            ]
        );
    }

    #[test]
    fn bundle_without_framework_has_no_helpers() {
        let dir = tempfile::tempdir().unwrap();
        assert!(updater_helpers(&dir.path().join("Demo.app")).is_empty());
    }
}
