//! Submission and status polling against `notarytool`.

use std::path::Path;

use super::{
    clock::Clock,
    config::NotaryConfig,
    status::{NotaryResponse, NotaryStatus, SubmissionRecord},
};
use crate::release::{
    error::{Error, Result},
    pipeline::Stage,
    secrets::{SecretName, SecretsMap},
    tools::{Invocation, ToolRunner, run_stage},
};

/// Drives one artifact from submission to a terminal outcome.
///
/// Status queries that fail at the transport level are not retried; the
/// error propagates and the wait is abandoned.
pub struct Notarizer<'a, R: ToolRunner + ?Sized, C: Clock + ?Sized> {
    runner: &'a R,
    clock: &'a C,
    config: NotaryConfig,
}

impl<'a, R: ToolRunner + ?Sized, C: Clock + ?Sized> Notarizer<'a, R, C> {
    pub fn new(runner: &'a R, clock: &'a C, config: NotaryConfig) -> Self {
        Self {
            runner,
            clock,
            config,
        }
    }

    pub fn config(&self) -> NotaryConfig {
        self.config
    }

    /// Submits `target` and waits for the service to accept it.
    ///
    /// `key_path` is the API private key on disk; key id and optional issuer
    /// come from `secrets`.
    pub fn notarize(
        &self,
        key_path: &Path,
        secrets: &SecretsMap,
        target: &Path,
        label: &str,
    ) -> Result<SubmissionRecord> {
        let deadline = self
            .clock
            .now()
            .checked_add(self.config.timeout())
            .ok_or_else(|| Error::config("notarization timeout is out of range"))?;
        let auth = auth_args(key_path, secrets)?;

        log::info!("Submitting {} for notarization...", label);
        let submit = Invocation::new("xcrun")
            .args(["notarytool", "submit"])
            .arg(target)
            .args(&auth)
            .quiet();
        let output = run_stage(self.runner, Stage::Notarize, &submit)?;
        let submission = NotaryResponse::parse(label, &output.stdout, None)?;

        let id = submission
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::Notarization {
                label: label.to_string(),
                submission_id: None,
                status: "missing submission id".to_string(),
            })?;
        log::info!("Notarization {} submission id: {}", label, id);

        match submission.status() {
            Some(NotaryStatus::Accepted) => {
                log::info!("✓ Notarization accepted for {}", label);
                return Ok(SubmissionRecord {
                    id,
                    status: NotaryStatus::Accepted,
                });
            }
            Some(NotaryStatus::Rejected(status)) => {
                return Err(rejected(label, &id, status));
            }
            Some(NotaryStatus::InProgress) | None => {}
        }

        let info = Invocation::new("xcrun")
            .args(["notarytool", "info"])
            .arg(&id)
            .args(&auth)
            .quiet();

        while self.clock.now() < deadline {
            log::info!("Checking notarization {}...", label);
            let output = run_stage(self.runner, Stage::Notarize, &info)?;
            let response = NotaryResponse::parse(label, &output.stdout, Some(&id))?;

            match response.status() {
                Some(NotaryStatus::Accepted) => {
                    log::info!("✓ Notarization accepted for {}", label);
                    return Ok(SubmissionRecord {
                        id,
                        status: NotaryStatus::Accepted,
                    });
                }
                Some(NotaryStatus::Rejected(status)) => {
                    if let Some(message) = response.message.as_deref() {
                        log::warn!("Notarization {} message: {}", label, message);
                    }
                    return Err(rejected(label, &id, status));
                }
                Some(NotaryStatus::InProgress) | None => {}
            }

            self.clock.sleep(self.config.poll_interval());
        }

        Err(Error::NotarizationTimeout {
            label: label.to_string(),
            submission_id: id,
            waited: self.config.timeout(),
        })
    }
}

fn auth_args(key_path: &Path, secrets: &SecretsMap) -> Result<Vec<String>> {
    let mut args = vec![
        "--key".to_string(),
        key_path.to_string_lossy().into_owned(),
        "--key-id".to_string(),
        secrets.require(SecretName::NotaryKeyId)?.to_string(),
        "--output-format".to_string(),
        "json".to_string(),
    ];
    if let Some(issuer) = secrets.get(SecretName::NotaryIssuerId) {
        args.push("--issuer".to_string());
        args.push(issuer.to_string());
    }
    Ok(args)
}

fn rejected(label: &str, id: &str, status: String) -> Error {
    Error::Notarization {
        label: label.to_string(),
        submission_id: Some(id.to_string()),
        status,
    }
}

/// Embeds the notarization ticket into `target`.
pub fn staple<R: ToolRunner + ?Sized>(runner: &R, target: &Path) -> Result<()> {
    let invocation = Invocation::new("xcrun").args(["stapler", "staple"]).arg(target);
    run_stage(runner, Stage::Staple, &invocation)?;
    log::info!("✓ Stapled ticket to {}", target.display());
    Ok(())
}
