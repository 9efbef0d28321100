//! Persistence of the artifact record alongside its owning build.
//!
//! The record lives and dies with the build's own data: it is written as a
//! single JSON document into the build's archive directory, so deleting the
//! build's archive deletes the record with it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::domain::build::BuildRef;
use crate::domain::record::ArtifactRecord;

/// File name of the record document within the build archive
pub const RECORD_FILE: &str = "artifacts.json";

/// JSON-document store for one build's artifact record
pub struct RecordStore {
    record_path: PathBuf,
}

impl RecordStore {
    /// Store location for a build's record
    pub fn for_build(build: &BuildRef) -> Self {
        Self {
            record_path: build.archive_root.join(RECORD_FILE),
        }
    }

    /// Path of the record document
    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    /// Persist the record.
    ///
    /// Write-then-rename, so a crash mid-write never leaves a truncated
    /// document where consumers expect a complete one.
    pub async fn save(&self, record: &ArtifactRecord) -> Result<()> {
        let json =
            serde_json::to_string_pretty(record).context("Failed to serialize artifact record")?;

        let tmp_path = self.record_path.with_extension("json.tmp");
        fs::write(&tmp_path, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write record: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.record_path)
            .await
            .with_context(|| format!("Failed to commit record: {}", self.record_path.display()))?;

        Ok(())
    }

    /// Load the record, or `None` when the build never saved one
    pub async fn load(&self) -> Result<Option<ArtifactRecord>> {
        if !self.record_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.record_path)
            .await
            .with_context(|| format!("Failed to read record: {}", self.record_path.display()))?;
        let record: ArtifactRecord = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse record: {}", self.record_path.display()))?;

        Ok(Some(record))
    }
}
