//! Entitlements materialization.

use std::fs;
use std::path::{Path, PathBuf};

use crate::release::error::{ErrorExt, Result};

/// Both spellings Xcode accepts for the bundle identifier build setting.
pub const BUNDLE_ID_PLACEHOLDERS: [&str; 2] =
    ["$(PRODUCT_BUNDLE_IDENTIFIER)", "${PRODUCT_BUNDLE_IDENTIFIER}"];

/// Produces the entitlements file to sign with.
///
/// - `source` absent: `Ok(None)`; callers decide whether that is fatal.
/// - no bundle identifier, or no placeholder in the file: the source path,
///   uncopied.
/// - otherwise: `output_dir/<label>.entitlements` with every placeholder
///   replaced by `bundle_id`.
///
/// The source file is never written.
pub fn prepare_entitlements(
    source: Option<&Path>,
    bundle_id: Option<&str>,
    output_dir: &Path,
    label: &str,
) -> Result<Option<PathBuf>> {
    let Some(source) = source else {
        return Ok(None);
    };
    let Some(bundle_id) = bundle_id else {
        log::debug!(
            "No bundle identifier resolved, signing with {} as-is",
            source.display()
        );
        return Ok(Some(source.to_path_buf()));
    };

    let content = fs::read_to_string(source).fs_context("reading entitlements", source)?;
    if !BUNDLE_ID_PLACEHOLDERS.iter().any(|p| content.contains(p)) {
        return Ok(Some(source.to_path_buf()));
    }

    let replaced = BUNDLE_ID_PLACEHOLDERS
        .iter()
        .fold(content, |acc, placeholder| acc.replace(placeholder, bundle_id));

    let output_path = output_dir.join(format!("{label}.entitlements"));
    fs::write(&output_path, replaced).fs_context("writing entitlements", &output_path)?;
    log::debug!(
        "Materialized {} entitlements at {}",
        label,
        output_path.display()
    );
    Ok(Some(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bundle_id_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("Demo.entitlements");
        fs::write(&source, "$(PRODUCT_BUNDLE_IDENTIFIER)").unwrap();

        let out = prepare_entitlements(Some(&source), None, dir.path(), "app").unwrap();
        assert_eq!(out, Some(source));
    }
}
