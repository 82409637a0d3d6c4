//! Packaging: zip archive for app notarization and the distributable DMG.

use std::path::Path;

use crate::release::{
    error::{Context, Result},
    pipeline::Stage,
    tools::{Invocation, ToolRunner, run_stage},
    utils::fs,
};

/// Compresses `app` into `zip` keeping the bundle as the archive root.
pub fn zip_app<R: ToolRunner + ?Sized>(runner: &R, app: &Path, zip: &Path) -> Result<()> {
    fs::remove_file(zip)?;
    let invocation = Invocation::new("ditto")
        .args(["-c", "-k", "--keepParent"])
        .arg(app)
        .arg(zip);
    run_stage(runner, Stage::Notarize, &invocation)?;
    log::debug!("Compressed {} to {}", app.display(), zip.display());
    Ok(())
}

/// Builds a compressed read-only disk image holding only `app`.
///
/// # Process
/// 1. Recreate `staging` and copy the signed bundle into it
/// 2. Run `hdiutil create` with UDZO compression, overwriting `dmg`
/// 3. Remove the staging directory
pub fn create_dmg<R: ToolRunner + ?Sized>(
    runner: &R,
    app: &Path,
    dmg: &Path,
    staging: &Path,
    volume_name: &str,
) -> Result<()> {
    log::info!("Creating DMG {}...", dmg.display());
    fs::remove_file(dmg)?;
    fs::create_dir_all(staging, true)?;

    let app_name = app
        .file_name()
        .with_context(|| format!("no bundle name in {}", app.display()))?;
    fs::copy_dir(app, &staging.join(app_name))?;

    let invocation = Invocation::new("hdiutil")
        .args(["create", "-volname", volume_name, "-srcfolder"])
        .arg(staging)
        .args(["-ov", "-format", "UDZO"])
        .arg(dmg);
    let result = run_stage(runner, Stage::DiskImage, &invocation);

    fs::remove_dir_all(staging)?;
    result?;

    log::info!("✓ Created UDZO DMG: {}", dmg.display());
    Ok(())
}
