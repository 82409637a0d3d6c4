//! Read-only project scan producing a [`PipelineDecision`].

use path_absolutize::Absolutize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::PipelineDecision;
use crate::release::{
    error::{ErrorExt, Result},
    project::ProjectDescriptor,
    utils::fs::find_files,
};

/// Output directory used when the caller supplies none, relative to the root.
pub const DEFAULT_OUTPUT_DIR: &str = "build/release";

/// Build directory used when the caller supplies none, relative to the root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// File name suffix of the updater helper entitlements.
pub const UPDATER_ENTITLEMENTS_FILE: &str = "sparkle.entitlements";

/// Feed signing executable.
pub const SIGN_UPDATE: &str = "sign_update";

/// Feed index generator executable.
pub const GENERATE_APPCAST: &str = "generate_appcast";

const INFO_MANIFEST_FILE: &str = "Info.plist";
const FEED_URL_MARKER: &str = "SUFeedURL";
const FEED_PUBLIC_KEY_MARKER: &str = "SUPublicEDKey";

/// Located update feed tool pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdaterTools {
    /// Signs a disk image with the feed's EdDSA key
    pub sign_update: PathBuf,
    /// Writes the feed index for a directory of releases
    pub generate_appcast: PathBuf,
}

/// A place the updater tools may be installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdaterRoot {
    /// Directory holding both executables directly
    Bin(PathBuf),
    /// Package-manager root with one subdirectory per version, each with a `bin/`
    Versioned(PathBuf),
}

/// Inputs to [`detect`] besides the project itself.
#[derive(Clone, Debug)]
pub struct DetectionOptions {
    /// Output directory override, relative to the project root when relative
    pub output_dir: Option<PathBuf>,
    /// Build directory override, relative to the project root when relative
    pub build_dir: Option<PathBuf>,
    /// Explicit updater tool directory; disables the well-known search
    pub updater_bin: Option<PathBuf>,
    /// Well-known updater installation roots, searched in order
    pub search_roots: Vec<UpdaterRoot>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            build_dir: None,
            updater_bin: None,
            search_roots: well_known_roots(),
        }
    }
}

impl DetectionOptions {
    /// Options with no well-known search roots; handy when only an explicit
    /// tool directory should be considered.
    pub fn isolated() -> Self {
        Self {
            search_roots: Vec::new(),
            ..Self::default()
        }
    }
}

fn well_known_roots() -> Vec<UpdaterRoot> {
    let mut roots = Vec::new();
    if let Some(home) = dirs::home_dir() {
        roots.push(UpdaterRoot::Bin(home.join(".local/bin")));
    }
    roots.push(UpdaterRoot::Versioned(PathBuf::from(
        "/opt/homebrew/Caskroom/sparkle",
    )));
    roots.push(UpdaterRoot::Versioned(PathBuf::from(
        "/usr/local/Caskroom/sparkle",
    )));
    roots
}

/// Scans the project and decides which stages apply.
///
/// Depends only on filesystem contents and `options`; running it twice
/// without changes in between yields equal decisions.
pub fn detect(project: &ProjectDescriptor, options: &DetectionOptions) -> Result<PipelineDecision> {
    // Walked paths inherit the root's form, so it must match the absolute skip set.
    let root = project
        .root()
        .absolutize()
        .fs_context("resolving project root", project.root())?
        .into_owned();
    let root = root.as_path();
    let output_dir = resolve_dir(root, options.output_dir.as_deref(), DEFAULT_OUTPUT_DIR)?;
    let build_dir = resolve_dir(root, options.build_dir.as_deref(), DEFAULT_BUILD_DIR)?;
    let skip = [output_dir.clone(), build_dir.clone()];

    let info_manifest_path = locate_info_manifest(root, &skip)?;
    let entitlements_path =
        locate_entitlements(root, &format!("{}.entitlements", project.name()), &skip)?;
    let updater_entitlements_path = locate_entitlements(root, UPDATER_ENTITLEMENTS_FILE, &skip)?;

    let feed_markers = match &info_manifest_path {
        Some(path) => has_feed_markers(path)?,
        None => false,
    };
    let updater_tools = find_updater_tools(options.updater_bin.as_deref(), &options.search_roots);
    let feed_enabled = feed_markers && updater_tools.is_some();

    log::debug!(
        "Detected feed markers={} tools={} for {}",
        feed_markers,
        updater_tools.is_some(),
        project.name()
    );

    let mut decision = PipelineDecision {
        build_app: true,
        sign_app: true,
        notarize_app: true,
        create_dmg: true,
        notarize_dmg: true,
        sign_update_feed: feed_enabled,
        generate_feed_entry: feed_enabled,
        feed_enabled,
        feed_markers,
        output_dir,
        build_dir,
        info_manifest_path,
        entitlements_path,
        updater_entitlements_path,
        updater_tools,
        missing_entitlements: false,
        missing_info_manifest: false,
    };
    decision.refresh_prerequisites();
    Ok(decision)
}

fn resolve_dir(root: &Path, requested: Option<&Path>, default: &str) -> Result<PathBuf> {
    let relative = requested.unwrap_or_else(|| Path::new(default));
    let resolved = relative
        .absolutize_from(root)
        .fs_context("resolving directory", relative)?;
    Ok(resolved.into_owned())
}

/// First Info manifest in traversal order (shallowest, then lexical).
pub fn locate_info_manifest(root: &Path, skip: &[PathBuf]) -> Result<Option<PathBuf>> {
    pick_first(find_files(root, skip, |name| name.ends_with(INFO_MANIFEST_FILE))?)
}

/// First file whose name ends with `suffix`.
pub fn locate_entitlements(root: &Path, suffix: &str, skip: &[PathBuf]) -> Result<Option<PathBuf>> {
    pick_first(find_files(root, skip, |name| name.ends_with(suffix))?)
}

fn pick_first(candidates: Vec<PathBuf>) -> Result<Option<PathBuf>> {
    if candidates.len() > 1 {
        log::warn!(
            "Found {} candidates, using {} (others: {})",
            candidates.len(),
            candidates[0].display(),
            candidates[1..]
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(candidates.into_iter().next())
}

/// True when the manifest mentions both the feed URL and public key markers.
pub fn has_feed_markers(info_manifest: &Path) -> Result<bool> {
    let bytes = fs::read(info_manifest).fs_context("reading Info manifest", info_manifest)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content.contains(FEED_URL_MARKER) && content.contains(FEED_PUBLIC_KEY_MARKER))
}

/// Locates the feed tool pair.
///
/// With `explicit_bin` only that directory is considered. Otherwise each
/// root is tried in order; a [`UpdaterRoot::Versioned`] root contributes only
/// its lexically greatest version directory.
pub fn find_updater_tools(explicit_bin: Option<&Path>, roots: &[UpdaterRoot]) -> Option<UpdaterTools> {
    let candidates: Vec<PathBuf> = match explicit_bin {
        Some(bin) => vec![bin.to_path_buf()],
        None => roots.iter().filter_map(candidate_bin).collect(),
    };

    candidates.iter().find_map(|bin| {
        let sign_update = bin.join(SIGN_UPDATE);
        let generate_appcast = bin.join(GENERATE_APPCAST);
        (sign_update.is_file() && generate_appcast.is_file()).then(|| {
            log::debug!("Found updater tools in {}", bin.display());
            UpdaterTools {
                sign_update,
                generate_appcast,
            }
        })
    })
}

fn candidate_bin(root: &UpdaterRoot) -> Option<PathBuf> {
    match root {
        UpdaterRoot::Bin(path) => Some(path.clone()),
        UpdaterRoot::Versioned(base) => {
            let entries = fs::read_dir(base).ok()?;
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
                .map(|entry| entry.file_name())
                .max()
                .map(|version| base.join(version).join("bin"))
        }
    }
}
