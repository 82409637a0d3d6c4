//! Per-run signing configuration files.
//!
//! - [`entitlements`] - bundle identifier substitution into entitlements
//! - [`team`] - team identifier resolution
//! - [`export_options`] - archive export configuration

pub mod entitlements;
pub mod export_options;
pub mod team;

pub use entitlements::{BUNDLE_ID_PLACEHOLDERS, prepare_entitlements};
pub use export_options::{EXPORT_OPTIONS_FILE, export_options, write_export_options};
pub use team::resolve_team_id;
