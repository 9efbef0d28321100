//! Installation of a record's artifacts into the local repository cache.

use std::io;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::adapters::{DescriptorMetadata, InstallationError, LookupError, Toolchain};
use crate::domain::record::ArtifactRecord;

/// Installation failure, surfaced on the first failing step
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("toolchain lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("installation failed: {0}")]
    Installation(#[from] InstallationError),
}

impl ArtifactRecord {
    /// Install all artifacts of this record into the local repository cache.
    ///
    /// Mirrors [`deploy`](ArtifactRecord::deploy) without the remote
    /// repository: the main artifact goes first, carrying descriptor metadata
    /// when the module produced a distinct main artifact, then each attached
    /// artifact in build insertion order. Local installs have no
    /// unique-versions concern.
    ///
    /// Not transactional: artifacts already installed when a later step fails
    /// stay installed.
    #[instrument(skip_all, fields(build = self.build().number, module = %self.build().module_name))]
    pub async fn install(&self, toolchain: &dyn Toolchain) -> Result<(), InstallError> {
        let handlers = toolchain.handler_registry()?;
        let installer = toolchain.installer()?;
        let factory = toolchain.artifact_factory()?;
        let local_repository = toolchain.local_repository()?;

        let mut main =
            self.main_artifact()
                .to_native(handlers.as_ref(), factory.as_ref(), self.build())?;
        if !self.is_descriptor_only() {
            let descriptor_file = self.descriptor_artifact().file(self.build())?;
            main.attach_metadata(DescriptorMetadata::new(descriptor_file));
        }

        debug!(file = %main.file_name(), "installing main artifact");
        installer
            .install(&main.file, &main, local_repository.as_ref())
            .await?;

        for artifact in self.attached_artifacts() {
            let native =
                artifact.to_native(handlers.as_ref(), factory.as_ref(), self.build())?;
            debug!(file = %native.file_name(), "installing attached artifact");
            installer
                .install(&native.file, &native, local_repository.as_ref())
                .await?;
        }

        Ok(())
    }
}
