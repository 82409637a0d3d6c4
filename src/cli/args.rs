//! Command line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::release::StageOverride;

/// Build, sign, notarize, package and publish macOS apps
#[derive(Parser, Debug)]
#[command(
    name = "appship",
    version,
    about = "Zero-config macOS release pipeline",
    long_about = "Builds, signs, notarizes, packages and publishes a macOS application.

The stages to run are detected from the project: entitlements, Info.plist and
update feed configuration. Credentials come from the environment:

  DEVELOPER_ID_APPLICATION        signing identity
  APP_STORE_CONNECT_KEY_ID        notary API key id
  APP_STORE_CONNECT_PRIVATE_KEY   notary API private key (.p8 contents)
  APP_STORE_CONNECT_ISSUER_ID     notary issuer id (optional)
  SPARKLE_PRIVATE_KEY             update feed signing key
  APPLE_TEAM_ID                   team id override (optional)

Exit codes: 0 success, 1 stage failure, 2 usage or configuration error,
3 missing notary credentials, 5 notarization rejected or timed out."
)]
pub struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Project location and directory overrides shared by most commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Scheme to build (defaults to the project name)
    #[arg(long, value_name = "NAME")]
    pub scheme: Option<String>,

    /// Project bundle, when the root holds more than one
    #[arg(long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Output directory for published artifacts
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for intermediate artifacts
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Directory holding sign_update and generate_appcast
    #[arg(long, env = "SPARKLE_BIN", value_name = "DIR")]
    pub updater_bin: Option<PathBuf>,
}

/// Notarization tunables.
#[derive(clap::Args, Debug, Clone)]
pub struct NotaryArgs {
    /// Give up waiting for notarization after this long (e.g. 90m, 2h)
    #[arg(long, env = "APPSHIP_NOTARY_TIMEOUT", value_name = "DURATION", default_value = "2h")]
    pub notary_timeout: String,

    /// Delay between notarization status queries (e.g. 30s)
    #[arg(long, env = "APPSHIP_NOTARY_POLL", value_name = "DURATION", default_value = "30s")]
    pub notary_poll: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every detected stage
    Release {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        notary: NotaryArgs,

        /// Print the detected pipeline and stop
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Machine-readable output
        #[arg(long)]
        json: bool,

        /// Skip the disk image and everything that needs it
        #[arg(long)]
        no_dmg: bool,

        /// Skip notarization
        #[arg(long)]
        no_notarize: bool,

        /// Skip the update feed
        #[arg(long)]
        no_sparkle: bool,
    },

    /// Archive, export and sign the app
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Package and sign a disk image from an existing app
    Dmg {
        #[command(flatten)]
        project: ProjectArgs,

        /// App bundle to package (defaults to the staged build)
        #[arg(long, value_name = "PATH")]
        app_path: Option<PathBuf>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Notarize a zip archive or disk image
    Notarize {
        #[command(flatten)]
        notary: NotaryArgs,

        /// Zip archive of an app bundle
        #[arg(long, value_name = "PATH", conflicts_with = "dmg_path")]
        zip_path: Option<PathBuf>,

        /// Disk image, stapled after acceptance
        #[arg(long, value_name = "PATH")]
        dmg_path: Option<PathBuf>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Sign a disk image and regenerate the update feed index
    Appcast {
        /// Disk image to publish in the feed
        #[arg(long, value_name = "PATH")]
        dmg_path: Option<PathBuf>,

        /// Directory for appcast.xml (defaults to the disk image's directory)
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Directory holding sign_update and generate_appcast
        #[arg(long, env = "SPARKLE_BIN", value_name = "DIR")]
        updater_bin: Option<PathBuf>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Report missing prerequisites
    Doctor {
        #[command(flatten)]
        project: ProjectArgs,

        /// Scaffold missing files and update the project's build settings
        #[arg(long)]
        fix: bool,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default `log` filter for the verbosity flags.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Collects `--no-*` flags into overrides, in a fixed order.
pub fn stage_overrides(no_dmg: bool, no_notarize: bool, no_feed: bool) -> Vec<StageOverride> {
    [
        (no_dmg, StageOverride::NoDmg),
        (no_notarize, StageOverride::NoNotarize),
        (no_feed, StageOverride::NoFeed),
    ]
    .into_iter()
    .filter_map(|(on, o)| on.then_some(o))
    .collect()
}
