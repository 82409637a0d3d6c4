use serde_json::json;

use super::{detect_project, print_json};
use crate::cli::args::{NotaryArgs, ProjectArgs, stage_overrides};
use crate::cli::secrets::load_secrets;
use crate::error::Result;
use crate::release::{NotaryConfig, Orchestrator, ReleaseContext, SystemClock, SystemRunner};

#[allow(clippy::too_many_arguments)]
pub fn run_release(
    project_args: &ProjectArgs,
    notary_args: &NotaryArgs,
    dry_run: bool,
    json: bool,
    no_dmg: bool,
    no_notarize: bool,
    no_sparkle: bool,
) -> Result<()> {
    let notary = NotaryConfig::from_strs(&notary_args.notary_timeout, &notary_args.notary_poll)?;
    let (project, mut decision) = detect_project(project_args)?;
    decision.apply_overrides(&stage_overrides(no_dmg, no_notarize, no_sparkle));

    if json {
        print_json(&json!({ "project": project, "pipeline": decision }))?;
    } else {
        println!("Project: {}", project.project_path().display());
        println!("Scheme: {}", project.scheme());
        println!(
            "Pipeline: build={} sign={} notarize-app={} dmg={} notarize-dmg={} feed={}",
            decision.build_app,
            decision.sign_app,
            decision.notarize_app,
            decision.create_dmg,
            decision.notarize_dmg,
            decision.generate_feed_entry
        );
    }

    if dry_run {
        return Ok(());
    }

    let context = ReleaseContext::new(project, decision, load_secrets());
    let report = Orchestrator::new(&SystemRunner, &SystemClock, notary).run(&context)?;

    if json {
        print_json(&report)?;
    } else {
        println!("App: {}", report.app.display());
        if let Some(published) = &report.published {
            println!("DMG: {}", published.path.display());
            println!("SHA-256: {}", published.sha256);
        }
        if let Some(index) = &report.feed_index {
            println!("Appcast: {}", index.display());
        }
    }
    Ok(())
}
