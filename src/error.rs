//! Top-level error type and exit-code mapping.
//!
//! Core failures arrive as [`crate::release::Error`]; everything the command
//! line layer adds on top is a [`CliError`].

use thiserror::Error;

use crate::release::{self, ErrorKind, SecretName};

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, AppshipError>;

/// Exit code for a clean run.
pub const EXIT_OK: i32 = 0;
/// Stage or filesystem failure.
pub const EXIT_FAILURE: i32 = 1;
/// Usage or configuration error.
pub const EXIT_USAGE: i32 = 2;
/// Notary credentials missing.
pub const EXIT_MISSING_NOTARY_KEY: i32 = 3;
/// Notarization rejected or timed out.
pub const EXIT_NOTARIZATION: i32 = 5;
/// Terminated by SIGINT/SIGTERM.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Main error type for all appship operations
#[derive(Error, Debug)]
pub enum AppshipError {
    /// CLI argument errors
    #[error("{0}")]
    Cli(#[from] CliError),

    /// Release pipeline errors
    #[error("{0}")]
    Release(#[from] release::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("invalid appship.toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl AppshipError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(CliError::ExecutionFailed { .. }) => EXIT_FAILURE,
            Self::Cli(_) | Self::Toml(_) => EXIT_USAGE,
            Self::Release(release::Error::MissingSecret {
                name: SecretName::NotaryKeyId | SecretName::NotaryPrivateKey,
            }) => EXIT_MISSING_NOTARY_KEY,
            Self::Release(e) => match e.kind() {
                ErrorKind::Configuration => EXIT_USAGE,
                ErrorKind::Notarization | ErrorKind::Timeout => EXIT_NOTARIZATION,
                ErrorKind::Stage | ErrorKind::Io => EXIT_FAILURE,
            },
            Self::Io(_) | Self::Json(_) | Self::Anyhow(_) => EXIT_FAILURE,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::Release(release::Error::MissingSecret { name }) => vec![format!(
                "Set {} in the environment",
                crate::cli::secret_env_var(*name)
            )],
            Self::Release(release::Error::NotarizationTimeout { submission_id, .. }) => vec![
                format!("Check the submission later with `xcrun notarytool info {submission_id}`"),
                "Raise the deadline with --notary-timeout or APPSHIP_NOTARY_TIMEOUT".to_string(),
            ],
            Self::Release(release::Error::Notarization {
                submission_id: Some(id),
                ..
            }) => vec![format!(
                "Inspect the log with `xcrun notarytool log {id}`"
            )],
            Self::Release(e) if e.kind() == ErrorKind::Configuration => {
                vec!["Run `appship doctor` to list missing prerequisites".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn exit_codes_follow_error_kind() {
        let missing_key: AppshipError = release::Error::MissingSecret {
            name: SecretName::NotaryPrivateKey,
        }
        .into();
        assert_eq!(missing_key.exit_code(), EXIT_MISSING_NOTARY_KEY);

        let missing_identity: AppshipError = release::Error::MissingSecret {
            name: SecretName::SigningIdentity,
        }
        .into();
        assert_eq!(missing_identity.exit_code(), EXIT_USAGE);

        let timeout: AppshipError = release::Error::NotarizationTimeout {
            label: "dmg".to_string(),
            submission_id: "abc".to_string(),
            waited: Duration::from_secs(60),
        }
        .into();
        assert_eq!(timeout.exit_code(), EXIT_NOTARIZATION);
        assert!(timeout.recovery_suggestions()[0].contains("abc"));

        let usage: AppshipError = CliError::MissingArgument {
            argument: "--zip-path".to_string(),
        }
        .into();
        assert_eq!(usage.exit_code(), EXIT_USAGE);
    }
}
