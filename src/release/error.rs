//! Error types for release pipeline operations.
//!
//! Every failure the core can produce is one of these variants. Callers map
//! them to exit codes through [`Error::kind`].

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

use super::{pipeline::Stage, secrets::SecretName};

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used for exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Project files or credentials missing before any stage ran
    Configuration,
    /// An external tool returned a non-success status
    Stage,
    /// Terminal non-accepted notarization status
    Notarization,
    /// Notarization deadline elapsed
    Timeout,
    /// Local filesystem failure
    Io,
}

/// Errors produced by detection, templating, notarization and orchestration.
#[derive(Error, Debug)]
pub enum Error {
    /// Required project files or settings are missing
    #[error("configuration error: {reason}")]
    Config {
        /// Human readable reason
        reason: String,
    },

    /// A secret required by the enabled stages was not supplied
    #[error("configuration error: missing secret {name}")]
    MissingSecret {
        /// Secret that was required
        name: SecretName,
    },

    /// External tool exited unsuccessfully
    #[error("{stage} failed: `{command}` exited with {status}{}", output_tail(.output))]
    ToolFailed {
        /// Stage the tool ran in
        stage: Stage,
        /// Rendered command line
        command: String,
        /// Exit status description
        status: String,
        /// Captured stdout/stderr
        output: String,
    },

    /// External tool could not be started at all
    #[error("{stage} failed: could not run `{command}`: {source}")]
    ToolSpawn {
        /// Stage the tool ran in
        stage: Stage,
        /// Rendered command line
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// Notarization reached a terminal status other than Accepted
    #[error("notarization failed for {label}: {status}")]
    Notarization {
        /// Artifact label ("app", "dmg", ...)
        label: String,
        /// Submission identifier, when one was issued
        submission_id: Option<String>,
        /// Terminal status or failure description
        status: String,
    },

    /// Notarization did not finish before the configured deadline
    #[error(
        "notarization timed out for {label} after {}s: {submission_id}",
        .waited.as_secs()
    )]
    NotarizationTimeout {
        /// Artifact label
        label: String,
        /// Submission identifier for manual follow-up
        submission_id: String,
        /// Configured deadline
        waited: Duration,
    },

    /// Filesystem error with the path it concerned
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being attempted
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Local failure raised while a stage was running
    #[error("{stage} failed: {source}")]
    StageIo {
        /// Stage that was running
        stage: Stage,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Directory traversal errors
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Path prefix errors while mirroring trees
    #[error("path error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Malformed JSON from a tool
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Property list encode/decode errors
    #[error("plist error: {0}")]
    Plist(#[from] plist::Error),

    /// Template rendering errors
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Regular expression compile errors
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

fn output_tail(output: &str) -> String {
    const MAX_LINES: usize = 20;

    let trimmed = output.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lines: Vec<&str> = trimmed.lines().collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    format!("\n{}", lines[start..].join("\n"))
}

impl Error {
    /// Classify this error for caller-side handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } | Self::MissingSecret { .. } => ErrorKind::Configuration,
            Self::ToolFailed { .. } | Self::ToolSpawn { .. } => ErrorKind::Stage,
            Self::Notarization { .. } => ErrorKind::Notarization,
            Self::NotarizationTimeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Io,
        }
    }

    /// Stage label for stage failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ToolFailed { stage, .. }
            | Self::ToolSpawn { stage, .. }
            | Self::StageIo { stage, .. } => Some(*stage),
            Self::Notarization { .. } | Self::NotarizationTimeout { .. } => Some(Stage::Notarize),
            _ => None,
        }
    }

    /// Submission identifier carried by notarization failures.
    pub fn submission_id(&self) -> Option<&str> {
        match self {
            Self::Notarization { submission_id, .. } => submission_id.as_deref(),
            Self::NotarizationTimeout { submission_id, .. } => Some(submission_id),
            _ => None,
        }
    }

    /// Label a local failure with the stage it happened in. Errors that
    /// already name a stage, or are not I/O failures, pass through.
    pub(crate) fn in_stage(self, stage: Stage) -> Self {
        if self.kind() != ErrorKind::Io || self.stage().is_some() {
            return self;
        }
        Self::StageIo {
            stage,
            source: Box::new(self),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

/// Attach a path and description to IO results.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`] naming `path`.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// anyhow-style context for options and foreign results.
pub trait Context<T> {
    /// Attach a static message.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Attach a lazily built message.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

impl<T> Context<T> for Result<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

/// Return early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::release::Error::GenericError(format!($($arg)*)))
    };
}
