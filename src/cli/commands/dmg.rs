use path_absolutize::Absolutize;
use serde_json::json;

use super::{detect_project, print_json};
use crate::cli::args::ProjectArgs;
use crate::cli::secrets::load_secrets;
use crate::error::{CliError, Result};
use crate::release::{
    SecretName, SystemRunner,
    orchestrator::{build::BuildLayout, package, signing},
    utils::fs,
};

/// Packages and signs a disk image from an already built app.
pub fn run_dmg(project_args: &ProjectArgs, app_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let (project, decision) = detect_project(project_args)?;
    let secrets = load_secrets();
    let identity = secrets.require(SecretName::SigningIdentity)?;

    let layout = BuildLayout::new(&project, &decision.build_dir);
    let app = match app_path {
        Some(path) => path.absolutize_from(project.root())?.to_path_buf(),
        None => layout.app.clone(),
    };
    if !app.is_dir() {
        return Err(CliError::InvalidArguments {
            reason: format!("App not found at {}", app.display()),
        }
        .into());
    }

    fs::create_dir_all(&decision.build_dir, false)?;
    package::create_dmg(&SystemRunner, &app, &layout.dmg, &layout.dmg_staging, project.name())?;
    signing::sign_dmg(&SystemRunner, &layout.dmg, identity)?;

    if json {
        print_json(&json!({ "dmgPath": layout.dmg }))?;
    } else {
        println!("DMG: {}", layout.dmg.display());
    }
    Ok(())
}
