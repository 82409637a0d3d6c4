use anyhow::Context;
use path_absolutize::Absolutize;
use serde_json::json;
use std::path::Path;

use super::print_json;
use crate::cli::secrets::load_secrets;
use crate::error::{CliError, Result};
use crate::release::{
    DetectionOptions, SecretName, SystemRunner, orchestrator::feed::generate_feed_entry,
    pipeline::find_updater_tools, utils::fs,
};

/// Signs an existing disk image and regenerates the feed index next to it.
pub fn run_appcast(
    dmg_path: Option<&Path>,
    output_dir: Option<&Path>,
    updater_bin: Option<&Path>,
    json: bool,
) -> Result<()> {
    let dmg = dmg_path.ok_or_else(|| CliError::MissingArgument {
        argument: "--dmg-path".to_string(),
    })?;
    let dmg = dmg.absolutize()?.to_path_buf();
    if !dmg.is_file() {
        return Err(CliError::InvalidArguments {
            reason: format!("DMG not found at {}", dmg.display()),
        }
        .into());
    }

    let tools = find_updater_tools(updater_bin, &DetectionOptions::default().search_roots)
        .ok_or_else(|| CliError::InvalidArguments {
            reason: "Update feed tools not found. Set SPARKLE_BIN or install Sparkle.".to_string(),
        })?;

    let secrets = load_secrets();
    let key = secrets.require(SecretName::FeedPrivateKey)?;

    let output_dir = match output_dir {
        Some(dir) => dir.absolutize()?.to_path_buf(),
        None => dmg
            .parent()
            .map(Path::to_path_buf)
            .context("disk image path has no parent directory")?,
    };
    fs::create_dir_all(&output_dir, false)?;

    let index = generate_feed_entry(
        &SystemRunner,
        &tools,
        &dmg,
        &output_dir,
        key,
        &std::env::temp_dir(),
    )?;

    if json {
        print_json(&json!({ "appcast": index }))?;
    } else {
        println!("Appcast: {}", index.display());
    }
    Ok(())
}
