//! Command line interface for appship.
//!
//! Parses arguments, reads credentials from the environment and dispatches
//! to [`commands`]. Everything else lives in [`crate::release`].

mod args;
pub mod commands;
mod secrets;

pub use args::{Args, Command, NotaryArgs, ProjectArgs, stage_overrides};
pub use secrets::{load_secrets, load_secrets_with, secret_env_var};

use crate::error::{EXIT_INTERRUPTED, EXIT_OK, Result};
use crate::release::orchestrator::purge_scoped_dirs;

/// Initializes `env_logger`. `RUST_LOG` overrides the flag-derived level.
pub fn init_logging(args: &Args) {
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .format_target(false)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Removes live credential directories on SIGINT/SIGTERM, then exits.
pub fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        let removed = purge_scoped_dirs();
        eprintln!("\nInterrupted, removed {removed} temporary credential directories");
        std::process::exit(EXIT_INTERRUPTED);
    });
    if let Err(e) = installed {
        log::warn!("Could not install interrupt handler: {}", e);
    }
}

/// Main CLI entry point
pub fn run(args: Args) -> Result<i32> {
    match args.command {
        Command::Release {
            project,
            notary,
            dry_run,
            json,
            no_dmg,
            no_notarize,
            no_sparkle,
        } => commands::run_release(
            &project,
            &notary,
            dry_run,
            json,
            no_dmg,
            no_notarize,
            no_sparkle,
        )?,
        Command::Build { project, json } => commands::run_build(&project, json)?,
        Command::Dmg {
            project,
            app_path,
            json,
        } => commands::run_dmg(&project, app_path.as_deref(), json)?,
        Command::Notarize {
            notary,
            zip_path,
            dmg_path,
            json,
        } => commands::run_notarize(&notary, zip_path.as_deref(), dmg_path.as_deref(), json)?,
        Command::Appcast {
            dmg_path,
            output_dir,
            updater_bin,
            json,
        } => commands::run_appcast(
            dmg_path.as_deref(),
            output_dir.as_deref(),
            updater_bin.as_deref(),
            json,
        )?,
        Command::Doctor { project, fix, json } => commands::run_doctor(&project, fix, json)?,
    }
    Ok(EXIT_OK)
}
