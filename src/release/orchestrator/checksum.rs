//! Artifact checksum calculation.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::release::error::{ErrorExt, Result};

/// A file copied into the output directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArtifact {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

impl PublishedArtifact {
    /// Reads size and digest of `path`.
    pub fn inspect(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)
            .fs_context("reading artifact metadata", path)?
            .len();
        Ok(Self {
            path: path.to_path_buf(),
            size,
            sha256: calculate_sha256(path)?,
        })
    }
}

/// Hex-encoded SHA-256 of a file, read in 8KB chunks.
pub fn calculate_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();

        let artifact = PublishedArtifact::inspect(&path).unwrap();
        assert_eq!(artifact.size, 3);
        assert_eq!(
            artifact.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
