//! macOS release pipeline library
//!
//! Turns an app project into a signed, notarized disk image with an optional
//! update feed entry:
//! - [`release`] - detection, templating, notarization and orchestration
//! - [`metadata`] - project discovery and `appship.toml`
//! - [`cli`] - the `appship` command line front end
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod metadata;
pub mod release;

// Re-export commonly used types
pub use error::{AppshipError, CliError, Result};
