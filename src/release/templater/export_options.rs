//! Archive export configuration.

use plist::{Dictionary, Value};
use std::path::Path;

use crate::release::error::Result;

/// File name of the export options document inside the run directory.
pub const EXPORT_OPTIONS_FILE: &str = "ExportOptions.plist";

/// Export options for a Developer ID distribution with manual signing.
pub fn export_options(team_id: &str) -> Dictionary {
    let mut options = Dictionary::new();
    options.insert("method".into(), Value::String("developer-id".into()));
    options.insert("destination".into(), Value::String("export".into()));
    options.insert("teamID".into(), Value::String(team_id.into()));
    options.insert("signingStyle".into(), Value::String("manual".into()));
    options.insert(
        "signingCertificate".into(),
        Value::String("Developer ID Application".into()),
    );
    options
}

/// Writes [`export_options`] as an XML property list, replacing any old file.
pub fn write_export_options(path: &Path, team_id: &str) -> Result<()> {
    plist::to_file_xml(path, &export_options(team_id))?;
    log::debug!("Wrote export options to {}", path.display());
    Ok(())
}
