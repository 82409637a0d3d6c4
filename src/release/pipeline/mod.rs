//! Pipeline decision record and stage dependency table.
//!
//! [`detect`] inspects a checkout and produces a [`PipelineDecision`]. Callers
//! may then switch stages off with [`PipelineDecision::disable`], which walks
//! [`CASCADES`] so that dependent stages never outlive their prerequisites.

mod detect;

pub use detect::{
    DetectionOptions, UpdaterRoot, UpdaterTools, detect, find_updater_tools, has_feed_markers,
    locate_entitlements, locate_info_manifest, DEFAULT_BUILD_DIR, DEFAULT_OUTPUT_DIR,
    GENERATE_APPCAST, SIGN_UPDATE, UPDATER_ENTITLEMENTS_FILE,
};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::secrets::SecretName;

/// Orchestrator steps, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Archive build
    Build,
    /// Archive export and staging
    Export,
    /// Per-run entitlements materialization
    Entitlements,
    /// Code signing of helpers and bundle
    Sign,
    /// Notarization submit and polling
    Notarize,
    /// Ticket stapling
    Staple,
    /// Disk image creation and signing
    DiskImage,
    /// Copy into the output directory
    Publish,
    /// Update feed signing and index generation
    FeedEntry,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Build => "build",
            Self::Export => "export",
            Self::Entitlements => "entitlements",
            Self::Sign => "sign",
            Self::Notarize => "notarize",
            Self::Staple => "staple",
            Self::DiskImage => "disk image",
            Self::Publish => "publish",
            Self::FeedEntry => "feed entry",
        };
        f.write_str(label)
    }
}

/// Toggleable stage flags of a [`PipelineDecision`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageFlag {
    BuildApp,
    SignApp,
    NotarizeApp,
    CreateDmg,
    NotarizeDmg,
    FeedEnabled,
    SignUpdateFeed,
    GenerateFeedEntry,
}

impl StageFlag {
    /// Every flag, in declaration order.
    pub const ALL: [StageFlag; 8] = [
        Self::BuildApp,
        Self::SignApp,
        Self::NotarizeApp,
        Self::CreateDmg,
        Self::NotarizeDmg,
        Self::FeedEnabled,
        Self::SignUpdateFeed,
        Self::GenerateFeedEntry,
    ];
}

/// Disabling the left flag forces every flag on the right off.
///
/// Implications are transitive: [`PipelineDecision::disable`] follows them
/// until no new flag changes.
pub const CASCADES: &[(StageFlag, &[StageFlag])] = &[
    (StageFlag::BuildApp, &[]),
    (
        StageFlag::SignApp,
        &[StageFlag::NotarizeApp, StageFlag::NotarizeDmg],
    ),
    (StageFlag::NotarizeApp, &[]),
    (
        StageFlag::CreateDmg,
        &[StageFlag::NotarizeDmg, StageFlag::GenerateFeedEntry],
    ),
    (StageFlag::NotarizeDmg, &[]),
    (
        StageFlag::FeedEnabled,
        &[StageFlag::SignUpdateFeed, StageFlag::GenerateFeedEntry],
    ),
    (StageFlag::SignUpdateFeed, &[StageFlag::GenerateFeedEntry]),
    (StageFlag::GenerateFeedEntry, &[]),
];

/// Caller-facing stage overrides (`--no-dmg`, `--no-notarize`, `--no-sparkle`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOverride {
    /// Skip disk image creation
    NoDmg,
    /// Skip both notarization stages
    NoNotarize,
    /// Skip the update feed path
    NoFeed,
}

impl StageOverride {
    /// Flags switched off directly by this override.
    pub const fn flags(self) -> &'static [StageFlag] {
        match self {
            Self::NoDmg => &[StageFlag::CreateDmg],
            Self::NoNotarize => &[StageFlag::NotarizeApp, StageFlag::NotarizeDmg],
            Self::NoFeed => &[StageFlag::FeedEnabled],
        }
    }
}

/// Snapshot of what the orchestrator should do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDecision {
    pub build_app: bool,
    pub sign_app: bool,
    pub notarize_app: bool,
    pub create_dmg: bool,
    pub notarize_dmg: bool,
    pub sign_update_feed: bool,
    pub generate_feed_entry: bool,
    pub feed_enabled: bool,
    /// Manifest declares both feed markers, regardless of tool availability
    pub feed_markers: bool,
    pub output_dir: PathBuf,
    pub build_dir: PathBuf,
    pub info_manifest_path: Option<PathBuf>,
    pub entitlements_path: Option<PathBuf>,
    pub updater_entitlements_path: Option<PathBuf>,
    pub updater_tools: Option<UpdaterTools>,
    pub missing_entitlements: bool,
    pub missing_info_manifest: bool,
}

impl PipelineDecision {
    /// Current value of a flag.
    pub fn flag(&self, flag: StageFlag) -> bool {
        match flag {
            StageFlag::BuildApp => self.build_app,
            StageFlag::SignApp => self.sign_app,
            StageFlag::NotarizeApp => self.notarize_app,
            StageFlag::CreateDmg => self.create_dmg,
            StageFlag::NotarizeDmg => self.notarize_dmg,
            StageFlag::FeedEnabled => self.feed_enabled,
            StageFlag::SignUpdateFeed => self.sign_update_feed,
            StageFlag::GenerateFeedEntry => self.generate_feed_entry,
        }
    }

    fn flag_mut(&mut self, flag: StageFlag) -> &mut bool {
        match flag {
            StageFlag::BuildApp => &mut self.build_app,
            StageFlag::SignApp => &mut self.sign_app,
            StageFlag::NotarizeApp => &mut self.notarize_app,
            StageFlag::CreateDmg => &mut self.create_dmg,
            StageFlag::NotarizeDmg => &mut self.notarize_dmg,
            StageFlag::FeedEnabled => &mut self.feed_enabled,
            StageFlag::SignUpdateFeed => &mut self.sign_update_feed,
            StageFlag::GenerateFeedEntry => &mut self.generate_feed_entry,
        }
    }

    /// Switches `flag` off along with everything that depends on it.
    pub fn disable(&mut self, flag: StageFlag) {
        let mut pending = vec![flag];
        while let Some(next) = pending.pop() {
            *self.flag_mut(next) = false;
            // The table is acyclic, so following every edge terminates.
            if let Some((_, dependents)) = CASCADES.iter().find(|(f, _)| *f == next) {
                pending.extend_from_slice(dependents);
            }
        }
        self.refresh_prerequisites();
    }

    /// Applies caller overrides in order.
    pub fn apply_overrides(&mut self, overrides: &[StageOverride]) {
        for flag in overrides.iter().flat_map(|o| o.flags()) {
            self.disable(*flag);
        }
    }

    /// Recomputes `missing_entitlements` and `missing_info_manifest`.
    pub fn refresh_prerequisites(&mut self) {
        self.missing_entitlements = self.entitlements_path.is_none()
            || (self.feed_enabled && self.updater_entitlements_path.is_none());
        self.missing_info_manifest = self.feed_enabled && self.info_manifest_path.is_none();
    }

    /// True when either notarization stage is on.
    pub fn needs_notary(&self) -> bool {
        self.notarize_app || self.notarize_dmg
    }

    /// Secrets the enabled stages cannot run without.
    pub fn required_secrets(&self) -> Vec<SecretName> {
        let mut required = Vec::new();
        if self.build_app || self.sign_app || self.create_dmg {
            required.push(SecretName::SigningIdentity);
        }
        if self.needs_notary() {
            required.push(SecretName::NotaryKeyId);
            required.push(SecretName::NotaryPrivateKey);
        }
        if self.generate_feed_entry {
            required.push(SecretName::FeedPrivateKey);
        }
        required
    }

    /// Secrets used when present but never required.
    pub fn optional_secrets(&self) -> Vec<SecretName> {
        let mut optional = vec![SecretName::TeamId];
        if self.needs_notary() {
            optional.push(SecretName::NotaryIssuerId);
        }
        optional
    }
}
