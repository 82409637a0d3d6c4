//! Project discovery from a source directory and its optional `appship.toml`.

use crate::error::{AppshipError, CliError, Result};
use crate::release::ProjectDescriptor;
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Per-project defaults file, read from the project root when present.
pub const CONFIG_FILE: &str = "appship.toml";

const PROJECT_EXTENSION: &str = "xcodeproj";

/// Settings read from [`CONFIG_FILE`]. Command line flags take precedence.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Scheme to build
    pub scheme: Option<String>,

    /// Project bundle, relative to the root
    pub project: Option<PathBuf>,

    /// Where published artifacts land
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for intermediate artifacts
    pub build_dir: Option<PathBuf>,

    /// Directory holding the update feed tools
    pub updater_bin: Option<PathBuf>,
}

/// Reads [`CONFIG_FILE`] from `root`, or defaults when it does not exist.
pub fn load_config(root: &Path) -> Result<ProjectConfig> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(ProjectConfig::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        AppshipError::Cli(CliError::ExecutionFailed {
            command: "read_config".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;
    let config: ProjectConfig = toml::from_str(&contents)?;
    log::debug!("Loaded {}", path.display());
    Ok(config)
}

/// Finds the single project bundle directly under `root`.
pub fn find_project_file(root: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        AppshipError::Cli(CliError::InvalidArguments {
            reason: format!("Cannot read project root {}: {}", root.display(), e),
        })
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir() && p.extension().is_some_and(|ext| ext == PROJECT_EXTENSION))
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(AppshipError::Cli(CliError::InvalidArguments {
            reason: format!(
                "No .{PROJECT_EXTENSION} found in {}; pass --project",
                root.display()
            ),
        })),
        1 => Ok(candidates.remove(0)),
        _ => Err(AppshipError::Cli(CliError::InvalidArguments {
            reason: format!(
                "Multiple projects found in {} ({}); pass --project",
                root.display(),
                candidates
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })),
    }
}

/// Resolves the project under `root`.
///
/// `project` is taken relative to `root` when relative. The app name is the
/// project bundle's stem and the scheme defaults to it.
pub fn resolve_project(
    root: &Path,
    scheme: Option<&str>,
    project: Option<&Path>,
) -> Result<ProjectDescriptor> {
    let root = root.absolutize()?.to_path_buf();

    let project_path = match project {
        Some(path) => {
            let path = path.absolutize_from(&root)?.to_path_buf();
            if !path.is_dir() {
                return Err(AppshipError::Cli(CliError::InvalidArguments {
                    reason: format!("Project not found at {}", path.display()),
                }));
            }
            path
        }
        None => find_project_file(&root)?,
    };

    let name = project_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppshipError::Cli(CliError::InvalidArguments {
                reason: format!("Invalid project path {}", project_path.display()),
            })
        })?;
    let scheme = scheme.map_or_else(|| name.clone(), str::to_string);

    log::debug!("Resolved project {} (scheme {})", project_path.display(), scheme);
    Ok(ProjectDescriptor::new(name, root, project_path, scheme))
}
