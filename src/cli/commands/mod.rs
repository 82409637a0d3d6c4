//! Command execution.
//!
//! Each command resolves its inputs, calls into [`crate::release`], and
//! prints the result. Progress goes to the log; results go to stdout.

mod appcast;
mod build;
mod dmg;
mod doctor;
mod notarize;
mod release;

pub use appcast::run_appcast;
pub use build::run_build;
pub use dmg::run_dmg;
pub use doctor::run_doctor;
pub use notarize::run_notarize;
pub use release::run_release;

use serde::Serialize;

use super::args::ProjectArgs;
use crate::error::Result;
use crate::metadata;
use crate::release::{DetectionOptions, PipelineDecision, ProjectDescriptor, detect};

/// Resolves the project and runs detection, merging `appship.toml` defaults
/// under the command line flags.
pub(crate) fn detect_project(args: &ProjectArgs) -> Result<(ProjectDescriptor, PipelineDecision)> {
    let config = metadata::load_config(&args.root)?;
    let project = metadata::resolve_project(
        &args.root,
        args.scheme.as_deref().or(config.scheme.as_deref()),
        args.project.as_deref().or(config.project.as_deref()),
    )?;

    let options = DetectionOptions {
        output_dir: args.output_dir.clone().or(config.output_dir),
        build_dir: args.build_dir.clone().or(config.build_dir),
        updater_bin: args.updater_bin.clone().or(config.updater_bin),
        ..DetectionOptions::default()
    };
    let decision = detect(&project, &options)?;
    Ok((project, decision))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
