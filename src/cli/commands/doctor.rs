use serde_json::json;

use super::{detect_project, print_json};
use crate::cli::args::ProjectArgs;
use crate::error::Result;
use crate::release::doctor::{self, FixOutcome};

/// Reports problems, and with `fix` scaffolds what is missing first.
pub fn run_doctor(project_args: &ProjectArgs, fix: bool, json: bool) -> Result<()> {
    let (project, _) = detect_project(project_args)?;

    let outcome = if fix {
        Some(doctor::fix(&project)?)
    } else {
        None
    };

    // Re-detect so the report reflects anything just written.
    let (project, decision) = detect_project(project_args)?;
    let report = doctor::diagnose(&project, &decision);
    let warnings = report.warnings();

    if json {
        return print_json(&json!({
            "report": report,
            "warnings": warnings,
            "fix": outcome,
        }));
    }

    println!("Project: {}", project.project_path().display());
    if let Some(FixOutcome { created, project_updated }) = &outcome {
        for path in created {
            println!("Created {}", path.display());
        }
        if *project_updated {
            println!("Updated project build settings.");
        }
    }
    if warnings.is_empty() {
        println!("✓ No problems found");
    }
    for warning in &warnings {
        log::warn!("{}", warning);
    }
    Ok(())
}
