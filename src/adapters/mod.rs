//! Capability interfaces for external systems.
//!
//! The record never talks to a real package toolchain or repository directly.
//! Every interaction goes through the narrow traits in this module, supplied
//! by the caller per invocation: the toolchain lookup surface, the repository
//! handles, the build log sink, and the fingerprint store. Tests wire up the
//! fakes in [`mock`] instead of a real toolchain.

pub mod mock;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::artifact::Artifact;
use crate::domain::build::BuildRef;

/// A required toolchain capability could not be resolved.
///
/// Fatal to the current operation; surfaced to the caller unmodified.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("no {capability} capability registered with this toolchain")]
    Missing { capability: &'static str },

    #[error("no {capability} capability registered for qualifier '{qualifier}'")]
    MissingQualified {
        capability: &'static str,
        qualifier: String,
    },
}

/// The remote repository rejected a deployment
#[derive(Debug, Error)]
#[error("repository '{repository}' rejected {file}: {reason}")]
pub struct DeploymentError {
    /// Identifier of the rejecting repository
    pub repository: String,
    /// File name of the artifact being deployed
    pub file: String,
    /// Repository-side reason, verbatim
    pub reason: String,
}

/// The local repository cache rejected an installation
#[derive(Debug, Error)]
#[error("local install of {file} failed: {reason}")]
pub struct InstallationError {
    /// File name of the artifact being installed
    pub file: String,
    /// Installer-side reason, verbatim
    pub reason: String,
}

/// Deployment strategy registered with the toolchain.
///
/// Unique (timestamped) versions deploy through the toolchain's default
/// strategy; non-unique versions need the legacy-compatible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStrategy {
    /// The toolchain's standard strategy, unique versions only
    Default,

    /// Legacy-compatible strategy that still writes non-unique versions
    Legacy,
}

impl DeployStrategy {
    /// Qualifier the strategy is registered under in the toolchain
    pub fn key(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Legacy => "legacy",
        }
    }

    /// Strategy matching an effective unique-versions decision
    pub fn for_unique_versions(unique: bool) -> Self {
        if unique {
            Self::Default
        } else {
            Self::Legacy
        }
    }
}

/// Type information the toolchain keeps per packaging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTypeHandler {
    /// Packaging this handler covers
    pub packaging: String,
    /// File extension artifacts of this packaging are published under
    pub extension: String,
}

/// Descriptor-file metadata attached to a native artifact so the descriptor
/// deploys alongside the main artifact instead of as a separate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorMetadata {
    /// Resolved path of the descriptor file
    pub file: PathBuf,
}

impl DescriptorMetadata {
    /// Wrap a resolved descriptor file
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }
}

/// Toolchain-native artifact object, as built by the [`ArtifactFactory`] and
/// consumed by deployers and installers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeArtifact {
    /// Group identifier
    pub group_id: String,
    /// Artifact identifier
    pub artifact_id: String,
    /// Version
    pub version: String,
    /// Packaging/type
    pub packaging: String,
    /// Optional classifier
    pub classifier: Option<String>,
    /// Extension resolved through the type handler
    pub extension: String,
    /// Resolved physical file
    pub file: PathBuf,
    /// Attached metadata, deployed together with the artifact
    pub metadata: Vec<DescriptorMetadata>,
}

impl NativeArtifact {
    /// Attach descriptor-file metadata
    pub fn attach_metadata(&mut self, metadata: DescriptorMetadata) {
        self.metadata.push(metadata);
    }

    /// Whether any descriptor metadata is attached
    pub fn has_descriptor_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }

    /// Name of the resolved physical file
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Artifact {
    /// Construct the toolchain-native artifact object for this artifact.
    ///
    /// Resolves the physical file against the owning build, then hands the
    /// coordinates and the packaging's type handler to the caller-supplied
    /// factory. A missing file propagates as a resolution error.
    pub fn to_native(
        &self,
        handlers: &dyn HandlerRegistry,
        factory: &dyn ArtifactFactory,
        build: &BuildRef,
    ) -> io::Result<NativeArtifact> {
        let file = self.file(build)?;
        let handler = handlers.handler_for(&self.packaging);
        Ok(factory.create(self, &handler, file))
    }
}

/// Maps packagings to the type information the toolchain keeps for them
pub trait HandlerRegistry: Send + Sync {
    /// Resolve the handler for a packaging
    fn handler_for(&self, packaging: &str) -> ArtifactTypeHandler;
}

/// Builds toolchain-native artifact objects from record artifacts
pub trait ArtifactFactory: Send + Sync {
    /// Create the native artifact for `artifact` with its resolved file
    fn create(
        &self,
        artifact: &Artifact,
        handler: &ArtifactTypeHandler,
        file: PathBuf,
    ) -> NativeArtifact;
}

/// Deploys artifact files to a remote repository
#[async_trait]
pub trait ArtifactDeployer: Send + Sync {
    /// Deploy one artifact file.
    ///
    /// Calls are issued strictly in sequence; the repository may require the
    /// main artifact to exist before attached artifacts reference it.
    async fn deploy(
        &self,
        file: &Path,
        artifact: &NativeArtifact,
        repository: &dyn RemoteRepository,
        local_repository: &dyn LocalRepository,
    ) -> Result<(), DeploymentError>;
}

/// Installs artifact files into the local repository cache
#[async_trait]
pub trait ArtifactInstaller: Send + Sync {
    /// Install one artifact file
    async fn install(
        &self,
        file: &Path,
        artifact: &NativeArtifact,
        local_repository: &dyn LocalRepository,
    ) -> Result<(), InstallationError>;
}

/// Handle to a remote artifact repository.
///
/// The unique-versions setting is both gettable and settable: the deploy
/// operation is permitted to mutate it on this caller-supplied handle as part
/// of toolchain-mode reconciliation. Callers passing a shared handle must
/// expect that side effect.
pub trait RemoteRepository: Send + Sync {
    /// Repository identifier
    fn id(&self) -> &str;

    /// Repository URL
    fn url(&self) -> &str;

    /// Whether the repository uses unique (timestamped) versions
    fn unique_versions(&self) -> bool;

    /// Force the effective unique-versions setting
    fn set_unique_versions(&self, unique: bool);
}

/// Handle to the local repository cache
pub trait LocalRepository: Send + Sync {
    /// Root directory of the cache
    fn root(&self) -> &Path;
}

/// Ordered sink for build log lines.
///
/// Lines are emitted before each artifact write and must read in deployment
/// order; no structured format is required.
pub trait LogSink: Send + Sync {
    /// Append one line
    fn line(&self, line: &str);
}

/// Persists content fingerprints for build-to-build traceability.
///
/// The store keeps the hash keyed by build and path; retrieval is its own
/// concern, not this crate's.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Record the digest of one artifact file for the owning build
    async fn record(&self, file: &Path, build: &BuildRef, sha256: &str) -> io::Result<()>;
}

/// Lookup surface of the embedded package toolchain.
///
/// Each method resolves one capability; a missing capability fails with a
/// [`LookupError`] and aborts the operation that needed it.
pub trait Toolchain: Send + Sync {
    /// Resolve the type handler registry
    fn handler_registry(&self) -> Result<Arc<dyn HandlerRegistry>, LookupError>;

    /// Resolve the native artifact factory
    fn artifact_factory(&self) -> Result<Arc<dyn ArtifactFactory>, LookupError>;

    /// Resolve the deployer registered under the strategy's qualifier
    fn deployer(&self, strategy: DeployStrategy) -> Result<Arc<dyn ArtifactDeployer>, LookupError>;

    /// Resolve the local installer
    fn installer(&self) -> Result<Arc<dyn ArtifactInstaller>, LookupError>;

    /// Resolve the toolchain's local repository context
    fn local_repository(&self) -> Result<Arc<dyn LocalRepository>, LookupError>;
}
