//! Release pipeline core.
//!
//! This module turns a resolved project into a signed, notarized and
//! published disk image:
//!
//! - [`pipeline`] - what to run ([`detect`], [`PipelineDecision`], stage cascades)
//! - [`templater`] - per-run entitlements and export options
//! - [`notary`] - notarization submit/poll state machine
//! - [`orchestrator`] - stage sequencing with scoped credential cleanup
//! - [`doctor`] - prerequisite diagnostics and scaffolding
//! - [`tools`] - the subprocess seam every stage goes through
//!
//! # Example
//!
//! ```no_run
//! use appship::release::{
//!     DetectionOptions, NotaryConfig, Orchestrator, ProjectDescriptor, ReleaseContext,
//!     SecretName, SecretsMap, SystemClock, SystemRunner, detect,
//! };
//!
//! # fn example() -> appship::release::Result<()> {
//! let project = ProjectDescriptor::new("Demo", "/src/demo", "/src/demo/Demo.xcodeproj", "Demo");
//! let decision = detect(&project, &DetectionOptions::default())?;
//! let secrets = SecretsMap::new()
//!     .with(SecretName::SigningIdentity, "Developer ID Application: Demo (ABCDEFGH12)");
//!
//! let context = ReleaseContext::new(project, decision, secrets);
//! let report = Orchestrator::new(&SystemRunner, &SystemClock, NotaryConfig::default())
//!     .run(&context)?;
//! println!("{:?}", report.published);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod doctor;
pub mod error;
pub mod notary;
pub mod orchestrator;
pub mod pipeline;
pub mod project;
pub mod secrets;
pub mod templater;
pub mod tools;
pub mod utils;

pub use context::ReleaseContext;
pub use error::{Context, Error, ErrorExt, ErrorKind, Result};
pub use notary::{Clock, NotaryConfig, Notarizer, SubmissionRecord, SystemClock};
pub use orchestrator::{Orchestrator, PublishedArtifact, ReleaseReport};
pub use pipeline::{
    DetectionOptions, PipelineDecision, Stage, StageFlag, StageOverride, UpdaterTools, detect,
};
pub use project::ProjectDescriptor;
pub use secrets::{SecretName, SecretsMap};
pub use tools::{Invocation, SystemRunner, ToolOutput, ToolRunner};
