//! The unit of work handed to the orchestrator.

use super::{pipeline::PipelineDecision, project::ProjectDescriptor, secrets::SecretsMap};

/// Project, decision and secrets for a single invocation.
///
/// Owns no persistent state; dropped after the run.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Resolved project
    pub project: ProjectDescriptor,
    /// Stages to run, decided before orchestration began
    pub decision: PipelineDecision,
    /// Explicit credentials
    pub secrets: SecretsMap,
}

impl ReleaseContext {
    /// Bundles the three inputs.
    pub fn new(project: ProjectDescriptor, decision: PipelineDecision, secrets: SecretsMap) -> Self {
        Self {
            project,
            decision,
            secrets,
        }
    }
}
