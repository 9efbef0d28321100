//! Deployment of a record's artifacts to a remote repository.
//!
//! Publishes the descriptor, main, and attached artifacts as one logical
//! unit, reconciling the repository's unique-versions setting with the
//! toolchain generation the build ran under.

use std::io;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::adapters::{
    DeployStrategy, DeploymentError, DescriptorMetadata, LogSink, LookupError, RemoteRepository,
    Toolchain,
};
use crate::domain::build::ToolchainMode;
use crate::domain::record::ArtifactRecord;

/// Deployment failure, surfaced on the first failing step
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("toolchain lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("deployment failed: {0}")]
    Deployment(#[from] DeploymentError),
}

impl ArtifactRecord {
    /// Deploy all artifacts of this record to a remote repository.
    ///
    /// The main artifact is deployed first, carrying the descriptor as
    /// attached metadata when the module produced a distinct main artifact,
    /// then each attached artifact in build insertion order through the same
    /// strategy instance. One line is written to `log` before each artifact
    /// write.
    ///
    /// Side effect on caller state: the repository handle's unique-versions
    /// setting may be force-set as part of toolchain-mode reconciliation.
    ///
    /// Not transactional: artifacts already deployed when a later step fails
    /// stay deployed. Re-invoking is an independent attempt; whether the
    /// repository rejects or overwrites already-published coordinates is its
    /// policy, not this record's.
    #[instrument(skip_all, fields(build = self.build().number, module = %self.build().module_name))]
    pub async fn deploy(
        &self,
        toolchain: &dyn Toolchain,
        repository: &dyn RemoteRepository,
        log: &dyn LogSink,
    ) -> Result<(), DeployError> {
        let handlers = toolchain.handler_registry()?;
        let factory = toolchain.artifact_factory()?;

        let mode = self.build().module_set.toolchain_mode();
        let unique_versions = reconcile_unique_versions(mode, repository, log);
        debug!(?mode, unique_versions, repository = repository.id(), "reconciled version policy");

        let mut main =
            self.main_artifact()
                .to_native(handlers.as_ref(), factory.as_ref(), self.build())?;
        if !self.is_descriptor_only() {
            let descriptor_file = self.descriptor_artifact().file(self.build())?;
            main.attach_metadata(DescriptorMetadata::new(descriptor_file));
        }

        // Deploying the main artifact also deploys the descriptor
        log.line(&format!("Deploying the main artifact {}", main.file_name()));

        let deployer = toolchain.deployer(DeployStrategy::for_unique_versions(unique_versions))?;
        let local_repository = toolchain.local_repository()?;

        deployer
            .deploy(&main.file, &main, repository, local_repository.as_ref())
            .await?;

        for artifact in self.attached_artifacts() {
            let native =
                artifact.to_native(handlers.as_ref(), factory.as_ref(), self.build())?;
            log.line(&format!(
                "Deploying the attached artifact {}",
                native.file_name()
            ));
            deployer
                .deploy(&native.file, &native, repository, local_repository.as_ref())
                .await?;
        }

        Ok(())
    }
}

/// Reconcile the repository's unique-versions setting with the toolchain
/// mode and return the effective setting used to pick the strategy.
///
/// The modern toolchain dropped non-unique versions, so a repository asking
/// for them under that mode gets a diagnostic and deploys with unique
/// versions anyway; its configured setting is left untouched.
fn reconcile_unique_versions(
    mode: ToolchainMode,
    repository: &dyn RemoteRepository,
    log: &dyn LogSink,
) -> bool {
    match (repository.unique_versions(), mode) {
        (true, ToolchainMode::Legacy) | (true, ToolchainMode::Modern) => {
            repository.set_unique_versions(true);
            true
        }
        (false, ToolchainMode::Modern) => {
            warn!(repository = repository.id(), "non-unique versions requested under the modern toolchain");
            log.line("unique_versions == false is not supported by the modern toolchain; deploying with unique versions");
            true
        }
        (false, ToolchainMode::Legacy) => {
            repository.set_unique_versions(false);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{BufferLogSink, MockRemoteRepository};

    #[test]
    fn test_unique_repository_is_forced_unique() {
        for mode in [ToolchainMode::Legacy, ToolchainMode::Modern] {
            let repository = MockRemoteRepository::new("releases", true);
            let log = BufferLogSink::new();

            assert!(reconcile_unique_versions(mode, &repository, &log));
            assert!(repository.unique_versions());
            assert_eq!(repository.set_calls(), vec![true]);
            assert!(log.lines().is_empty());
        }
    }

    #[test]
    fn test_non_unique_under_legacy_is_forced_non_unique() {
        let repository = MockRemoteRepository::new("releases", false);
        let log = BufferLogSink::new();

        assert!(!reconcile_unique_versions(
            ToolchainMode::Legacy,
            &repository,
            &log
        ));
        assert!(!repository.unique_versions());
        assert_eq!(repository.set_calls(), vec![false]);
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_non_unique_under_modern_logs_and_leaves_setting() {
        let repository = MockRemoteRepository::new("releases", false);
        let log = BufferLogSink::new();

        assert!(reconcile_unique_versions(
            ToolchainMode::Modern,
            &repository,
            &log
        ));
        // Setting untouched, diagnostic emitted instead
        assert!(!repository.unique_versions());
        assert!(repository.set_calls().is_empty());
        assert_eq!(log.lines().len(), 1);
        assert!(log.lines()[0].contains("not supported"));
    }
}
