//! Notarization service responses.

use serde::Deserialize;
use std::fmt;

use crate::release::error::{Error, Result};

/// Status reported for a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotaryStatus {
    InProgress,
    Accepted,
    /// Any other terminal status (`Invalid`, `Rejected`, ...), verbatim
    Rejected(String),
}

impl NotaryStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "In Progress" => Self::InProgress,
            "Accepted" => Self::Accepted,
            other => Self::Rejected(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for NotaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => f.write_str("In Progress"),
            Self::Accepted => f.write_str("Accepted"),
            Self::Rejected(status) => f.write_str(status),
        }
    }
}

/// JSON body printed by `notarytool submit|info --output-format json`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NotaryResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NotaryResponse {
    /// Parses tool stdout; empty or malformed output is a notarization failure.
    pub fn parse(label: &str, stdout: &str, submission_id: Option<&str>) -> Result<Self> {
        let trimmed = stdout.trim();
        let failure = |status: String| Error::Notarization {
            label: label.to_string(),
            submission_id: submission_id.map(str::to_string),
            status,
        };
        if trimmed.is_empty() {
            return Err(failure("empty response".to_string()));
        }
        serde_json::from_str(trimmed).map_err(|_| failure(trimmed.to_string()))
    }

    /// Parsed status, if the response carried a non-blank one.
    pub fn status(&self) -> Option<NotaryStatus> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(NotaryStatus::parse)
    }
}

/// Outcome of one notarization call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: String,
    pub status: NotaryStatus,
}
