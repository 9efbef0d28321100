//! Content fingerprinting for build-to-build traceability.
//!
//! Each artifact file is read once, digested with SHA-256, and the hex digest
//! is handed to the external fingerprint store, which persists it keyed by
//! build and path.

use std::io;

use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::adapters::FingerprintStore;
use crate::domain::artifact::Artifact;
use crate::domain::build::BuildRef;
use crate::domain::record::ArtifactRecord;

/// Compute the SHA-256 of bytes as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

impl Artifact {
    /// Fingerprint this artifact's file for the owning build.
    ///
    /// The first I/O failure, whether reading the file or persisting the
    /// digest, propagates to the caller.
    pub async fn record_fingerprint(
        &self,
        build: &BuildRef,
        store: &dyn FingerprintStore,
    ) -> io::Result<()> {
        let file = self.file(build)?;
        let bytes = tokio::fs::read(&file).await?;
        let digest = sha256_hex(&bytes);
        store.record(&file, build, &digest).await
    }
}

impl ArtifactRecord {
    /// Fingerprint every artifact of this record: main first, then each
    /// attached artifact in build insertion order.
    ///
    /// Stops at the first failure; artifacts after it are not fingerprinted.
    #[instrument(skip_all, fields(build = self.build().number, module = %self.build().module_name))]
    pub async fn record_fingerprints(&self, store: &dyn FingerprintStore) -> io::Result<()> {
        self.main_artifact()
            .record_fingerprint(self.build(), store)
            .await?;
        for artifact in self.attached_artifacts() {
            artifact.record_fingerprint(self.build(), store).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_hex_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
