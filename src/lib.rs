//! armory - Build artifact record keeper for CI builds
//!
//! Remembers which artifacts one build execution produced and redistributes
//! them on demand: deploy to a shared remote repository, install into the
//! local repository cache, or fingerprint for build-to-build traceability.
//! The build engine that produces the artifacts and the package toolchain
//! that moves them are external; this crate is the record and the thin
//! orchestration over the toolchain's capabilities.
//!
//! # Architecture
//!
//! The record is constructed once per build, after the build completes, and
//! is immutable afterward:
//! - The descriptor, main, and attached artifacts form one logical unit
//! - Operations run strictly in order (main first, then attached) and are
//!   fail-fast with no rollback
//! - Every external interaction goes through a capability trait, so tests
//!   run against the fakes in `adapters::mock`, never a real toolchain
//!
//! # Modules
//!
//! - `adapters`: Capability interfaces to the toolchain, repositories,
//!   log sink, and fingerprint store
//! - `core`: Operations (deploy, install, fingerprint, record persistence)
//! - `domain`: Data structures (Artifact, BuildRef, ArtifactRecord)
//! - `config`: Layered repository settings

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{
    ArtifactDeployer, ArtifactFactory, ArtifactInstaller, DeployStrategy, FingerprintStore,
    HandlerRegistry, LocalRepository, LogSink, LookupError, NativeArtifact, RemoteRepository,
    Toolchain,
};
pub use crate::core::{DeployError, InstallError, RecordStore};
pub use domain::{
    AggregatedArtifactRecord, Artifact, ArtifactRecord, BuildRef, ModuleSetBuildRef, ToolchainMode,
};
