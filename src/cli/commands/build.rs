use super::{detect_project, print_json};
use crate::cli::args::ProjectArgs;
use crate::cli::secrets::load_secrets;
use crate::error::Result;
use crate::release::{
    NotaryConfig, Orchestrator, ReleaseContext, StageFlag, SystemClock, SystemRunner,
};

/// Archive, export and sign only.
pub fn run_build(project_args: &ProjectArgs, json: bool) -> Result<()> {
    let (project, mut decision) = detect_project(project_args)?;
    decision.disable(StageFlag::NotarizeApp);
    decision.disable(StageFlag::CreateDmg);

    let context = ReleaseContext::new(project, decision, load_secrets());
    let report =
        Orchestrator::new(&SystemRunner, &SystemClock, NotaryConfig::default()).run(&context)?;

    if json {
        print_json(&report)?;
    } else {
        println!("Built app: {}", report.app.display());
    }
    Ok(())
}
