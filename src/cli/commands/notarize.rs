use path_absolutize::Absolutize;
use serde_json::json;
use std::path::Path;

use super::print_json;
use crate::cli::args::NotaryArgs;
use crate::cli::secrets::load_secrets;
use crate::error::{CliError, Result};
use crate::release::{
    NotaryConfig, SystemClock, SystemRunner, notary::staple, orchestrator::notarize_artifact,
};

/// Notarizes a single archive or disk image. Disk images are stapled.
pub fn run_notarize(
    notary_args: &NotaryArgs,
    zip_path: Option<&Path>,
    dmg_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let target = zip_path.or(dmg_path).ok_or_else(|| CliError::MissingArgument {
        argument: "--zip-path or --dmg-path".to_string(),
    })?;
    let target = target.absolutize()?.to_path_buf();
    if !target.is_file() {
        return Err(CliError::InvalidArguments {
            reason: format!("Artifact not found at {}", target.display()),
        }
        .into());
    }

    let config = NotaryConfig::from_strs(&notary_args.notary_timeout, &notary_args.notary_poll)?;
    let secrets = load_secrets();
    let record = notarize_artifact(
        &SystemRunner,
        &SystemClock,
        config,
        &secrets,
        &target,
        "artifact",
        &std::env::temp_dir(),
    )?;

    if dmg_path.is_some() {
        staple(&SystemRunner, &target)?;
    }

    if json {
        print_json(&json!({ "target": target, "submissionId": record.id }))?;
    } else {
        println!("Notarized {} ({})", target.display(), record.id);
    }
    Ok(())
}
