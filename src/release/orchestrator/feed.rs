//! Update feed signing and index generation.

use std::path::{Path, PathBuf};

use super::credentials::ScopedDir;
use crate::release::{
    error::Result,
    pipeline::{Stage, UpdaterTools},
    tools::{Invocation, ToolRunner, run_stage},
};

/// File name of the generated feed index.
pub const FEED_INDEX_FILE: &str = "appcast.xml";

const FEED_KEY_FILE: &str = "feed_private_key";

/// Signs `dmg` and regenerates the feed index for `output_dir`.
///
/// The private key lives in a fresh directory under `scratch_parent` only for
/// the two tool calls, and is removed whether or not they succeed.
pub fn generate_feed_entry<R: ToolRunner + ?Sized>(
    runner: &R,
    tools: &UpdaterTools,
    dmg: &Path,
    output_dir: &Path,
    private_key: &str,
    scratch_parent: &Path,
) -> Result<PathBuf> {
    let key_dir = ScopedDir::new_in(scratch_parent, "feed-key-")?;
    let key_path = key_dir.write_secret(FEED_KEY_FILE, private_key.trim())?;
    let index = output_dir.join(FEED_INDEX_FILE);

    log::info!("Signing update {}...", dmg.display());
    let sign = Invocation::for_path(&tools.sign_update)
        .arg("-f")
        .arg(&key_path)
        .arg(dmg);
    run_stage(runner, Stage::FeedEntry, &sign)?;

    log::info!("Generating feed index...");
    let generate = Invocation::for_path(&tools.generate_appcast)
        .arg("--ed-key-file")
        .arg(&key_path)
        .arg("-o")
        .arg(&index)
        .arg(output_dir);
    run_stage(runner, Stage::FeedEntry, &generate)?;

    key_dir.close()?;
    log::info!("✓ Feed index written to {}", index.display());
    Ok(index)
}
