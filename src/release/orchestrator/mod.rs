//! Release orchestration.
//!
//! [`Orchestrator::run`] executes the stages a [`PipelineDecision`] enables,
//! strictly in order:
//!
//! 1. archive build and export ([`build`])
//! 2. staging into `<build>/<Name>.app`
//! 3. per-run entitlements ([`crate::release::templater`])
//! 4. signing, updater helpers before the bundle ([`signing`])
//! 5. app notarization and stapling
//! 6. disk image creation and signing ([`package`])
//! 7. disk image notarization and stapling
//! 8. publish into the output directory
//! 9. update feed signing and index generation ([`feed`])
//!
//! The first failing stage aborts the run. Generated configuration and
//! credentials live in [`ScopedDir`]s that are removed on every exit path.
//!
//! [`PipelineDecision`]: crate::release::pipeline::PipelineDecision

pub mod build;
mod checksum;
pub mod credentials;
pub mod feed;
pub mod package;
pub mod signing;

pub use checksum::{PublishedArtifact, calculate_sha256};
pub use credentials::{ScopedDir, live_scoped_dirs, purge_scoped_dirs};

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::release::{
    context::ReleaseContext,
    error::{Error, ErrorExt, Result},
    notary::{Clock, NotaryConfig, Notarizer, SubmissionRecord, staple},
    pipeline::Stage,
    secrets::{SecretName, SecretsMap},
    templater::{EXPORT_OPTIONS_FILE, prepare_entitlements, resolve_team_id, write_export_options},
    tools::ToolRunner,
    utils::fs,
};
use build::BuildLayout;

const NOTARY_KEY_FILE: &str = "AuthKey.p8";

/// A notarized artifact and the submission that accepted it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotarizedArtifact {
    pub label: String,
    pub submission_id: String,
}

/// What a successful run produced.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseReport {
    /// Staged (and signed, when enabled) bundle
    pub app: PathBuf,
    /// Disk image in the build directory
    pub dmg: Option<PathBuf>,
    /// Disk image copied to the output directory
    pub published: Option<PublishedArtifact>,
    /// Generated feed index
    pub feed_index: Option<PathBuf>,
    pub notarized: Vec<NotarizedArtifact>,
}

/// Notary API key written to a scoped directory.
struct NotaryKey {
    dir: ScopedDir,
    path: PathBuf,
}

impl NotaryKey {
    fn write(parent: &Path, secrets: &SecretsMap) -> Result<Self> {
        let key = secrets.require(SecretName::NotaryPrivateKey)?;
        let dir = ScopedDir::new_in(parent, "notary-")?;
        let path = dir.write_secret(NOTARY_KEY_FILE, key)?;
        Ok(Self { dir, path })
    }
}

/// Submits `target` for notarization using a key written under `scratch_parent`
/// for the duration of the call only.
pub fn notarize_artifact<R: ToolRunner + ?Sized, C: Clock + ?Sized>(
    runner: &R,
    clock: &C,
    config: NotaryConfig,
    secrets: &SecretsMap,
    target: &Path,
    label: &str,
    scratch_parent: &Path,
) -> Result<SubmissionRecord> {
    let key = NotaryKey::write(scratch_parent, secrets)?;
    let record = Notarizer::new(runner, clock, config).notarize(&key.path, secrets, target, label)?;
    key.dir.close()?;
    Ok(record)
}

/// Sequences every enabled stage for one release.
pub struct Orchestrator<'a, R: ToolRunner + ?Sized, C: Clock + ?Sized> {
    runner: &'a R,
    clock: &'a C,
    notary: NotaryConfig,
}

impl<'a, R: ToolRunner + ?Sized, C: Clock + ?Sized> Orchestrator<'a, R, C> {
    pub fn new(runner: &'a R, clock: &'a C, notary: NotaryConfig) -> Self {
        Self {
            runner,
            clock,
            notary,
        }
    }

    /// Checks everything that can be checked before touching the filesystem.
    ///
    /// Returns the resolved team id when the build stage needs one.
    pub fn preflight(&self, context: &ReleaseContext) -> Result<Option<String>> {
        let decision = &context.decision;

        if decision.missing_entitlements {
            let which = if decision.entitlements_path.is_none() {
                format!("{}.entitlements", context.project.name())
            } else {
                crate::release::pipeline::UPDATER_ENTITLEMENTS_FILE.to_string()
            };
            return Err(Error::config(format!(
                "missing entitlements file {which}; run `appship doctor --fix`"
            )));
        }
        if decision.missing_info_manifest {
            return Err(Error::config(
                "missing Info.plist for the update feed; run `appship doctor --fix`",
            ));
        }

        for name in decision.required_secrets() {
            context.secrets.require(name)?;
        }

        if decision.generate_feed_entry && decision.updater_tools.is_none() {
            return Err(Error::config("update feed tools not found"));
        }

        if decision.build_app {
            let identity = context.secrets.require(SecretName::SigningIdentity)?;
            let team_id = resolve_team_id(identity, context.secrets.get(SecretName::TeamId))?;
            return Ok(Some(team_id));
        }
        Ok(None)
    }

    /// Runs the release described by `context`.
    pub fn run(&self, context: &ReleaseContext) -> Result<ReleaseReport> {
        let team_id = self.preflight(context)?;

        let ReleaseContext {
            project,
            decision,
            secrets,
        } = context;
        let layout = BuildLayout::new(project, &decision.build_dir);
        let mut report = ReleaseReport {
            app: layout.app.clone(),
            ..ReleaseReport::default()
        };

        fs::create_dir_all(&decision.build_dir, false)?;
        fs::create_dir_all(&decision.output_dir, false)?;

        let run_dir = ScopedDir::new_in(&decision.build_dir, "run-")?;

        // Entitlements
        let bundle_id = if decision.sign_app {
            build::resolve_bundle_identifier(self.runner, project)
        } else {
            None
        };
        let app_entitlements = prepare_entitlements(
            decision.entitlements_path.as_deref(),
            bundle_id.as_deref(),
            run_dir.path(),
            "app",
        )
        .map_err(|e| e.in_stage(Stage::Entitlements))?;
        let updater_entitlements = if decision.sign_update_feed {
            prepare_entitlements(
                decision.updater_entitlements_path.as_deref(),
                bundle_id.as_deref(),
                run_dir.path(),
                "updater",
            )
            .map_err(|e| e.in_stage(Stage::Entitlements))?
        } else {
            None
        };

        // Build and stage
        if let Some(team_id) = team_id.as_deref() {
            let identity = secrets.require(SecretName::SigningIdentity)?;
            let options = run_dir.path().join(EXPORT_OPTIONS_FILE);
            write_export_options(&options, team_id).map_err(|e| e.in_stage(Stage::Export))?;
            let exported =
                build::archive_and_export(self.runner, project, &layout, identity, &options)?;
            build::stage_app(&exported, &layout).map_err(|e| e.in_stage(Stage::Export))?;
        } else if layout.app.is_dir() {
            log::debug!("Build disabled, using staged {}", layout.app.display());
        } else {
            return Err(Error::config(format!(
                "build disabled and no app found at {}",
                layout.app.display()
            )));
        }

        // Sign
        if decision.sign_app {
            let identity = secrets.require(SecretName::SigningIdentity)?;
            signing::sign_updater_helpers(
                self.runner,
                &layout.app,
                identity,
                updater_entitlements.as_deref(),
            )?;
            signing::sign_app(self.runner, &layout.app, identity, app_entitlements.as_deref())?;
        }

        let notarizer = Notarizer::new(self.runner, self.clock, self.notary);
        let mut notary_key = if decision.needs_notary() {
            Some(NotaryKey::write(&decision.build_dir, secrets)?)
        } else {
            None
        };

        // App notarization
        if decision.notarize_app
            && let Some(key) = notary_key.as_ref()
        {
            package::zip_app(self.runner, &layout.app, &layout.app_zip)?;
            let record = notarizer.notarize(&key.path, secrets, &layout.app_zip, "app")?;
            staple(self.runner, &layout.app)?;
            fs::remove_file(&layout.app_zip).map_err(|e| e.in_stage(Stage::Staple))?;
            report.notarized.push(NotarizedArtifact {
                label: "app".to_string(),
                submission_id: record.id,
            });
        }

        if !(decision.notarize_dmg && decision.create_dmg)
            && let Some(key) = notary_key.take()
        {
            key.dir.close()?;
        }

        // Disk image
        if decision.create_dmg {
            let identity = secrets.require(SecretName::SigningIdentity)?;
            package::create_dmg(
                self.runner,
                &layout.app,
                &layout.dmg,
                &layout.dmg_staging,
                project.name(),
            )
            .map_err(|e| e.in_stage(Stage::DiskImage))?;
            signing::sign_dmg(self.runner, &layout.dmg, identity)?;
            report.dmg = Some(layout.dmg.clone());

            if decision.notarize_dmg
                && let Some(key) = notary_key.take()
            {
                let record = notarizer.notarize(&key.path, secrets, &layout.dmg, "dmg")?;
                key.dir.close()?;
                staple(self.runner, &layout.dmg)?;
                report.notarized.push(NotarizedArtifact {
                    label: "dmg".to_string(),
                    submission_id: record.id,
                });
            }

            // Publish
            let published_path = decision.output_dir.join(project.dmg_file_name());
            let published = std::fs::copy(&layout.dmg, &published_path)
                .fs_context("publishing disk image to", &published_path)
                .and_then(|_| PublishedArtifact::inspect(&published_path))
                .map_err(|e| e.in_stage(Stage::Publish))?;
            log::info!(
                "✓ Published {} ({} bytes, sha256 {})",
                published.path.display(),
                published.size,
                published.sha256
            );

            // Update feed
            if decision.generate_feed_entry
                && let Some(tools) = decision.updater_tools.as_ref()
            {
                let key = secrets.require(SecretName::FeedPrivateKey)?;
                let index = feed::generate_feed_entry(
                    self.runner,
                    tools,
                    &published.path,
                    &decision.output_dir,
                    key,
                    &decision.build_dir,
                )
                .map_err(|e| e.in_stage(Stage::FeedEntry))?;
                report.feed_index = Some(index);
            }

            report.published = Some(published);
        } else {
            log::debug!("Disk image disabled, nothing to publish");
        }

        run_dir.close()?;
        Ok(report)
    }
}
