//! Mock collaborator implementations.
//!
//! Deterministic fakes for every capability trait, used by unit and
//! integration tests instead of a real toolchain. The deployer, installer,
//! and fingerprint store record their calls in order and can be told to fail
//! on a specific call to exercise the fail-fast, no-rollback contract.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::artifact::Artifact;
use crate::domain::build::BuildRef;

use super::{
    ArtifactDeployer, ArtifactFactory, ArtifactInstaller, ArtifactTypeHandler, DeployStrategy,
    DeploymentError, FingerprintStore, HandlerRegistry, InstallationError, LocalRepository,
    LogSink, LookupError, NativeArtifact, RemoteRepository, Toolchain,
};

/// Handler registry mapping every packaging to itself as the extension
#[derive(Debug, Default)]
pub struct MockHandlerRegistry;

impl HandlerRegistry for MockHandlerRegistry {
    fn handler_for(&self, packaging: &str) -> ArtifactTypeHandler {
        ArtifactTypeHandler {
            packaging: packaging.to_string(),
            extension: packaging.to_string(),
        }
    }
}

/// Factory that copies coordinates straight into the native artifact
#[derive(Debug, Default)]
pub struct MockArtifactFactory;

impl ArtifactFactory for MockArtifactFactory {
    fn create(
        &self,
        artifact: &Artifact,
        handler: &ArtifactTypeHandler,
        file: PathBuf,
    ) -> NativeArtifact {
        NativeArtifact {
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            version: artifact.version.clone(),
            packaging: artifact.packaging.clone(),
            classifier: artifact.classifier.clone(),
            extension: handler.extension.clone(),
            file,
            metadata: Vec::new(),
        }
    }
}

/// One observed deploy or install call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// File passed to the call
    pub file: PathBuf,
    /// Artifact identifier of the native artifact
    pub artifact_id: String,
    /// Classifier of the native artifact
    pub classifier: Option<String>,
    /// Whether descriptor metadata was attached at call time
    pub has_descriptor_metadata: bool,
    /// Identifier of the target repository ("local" for installs)
    pub repository_id: String,
}

impl RecordedCall {
    fn from_artifact(artifact: &NativeArtifact, file: &Path, repository_id: &str) -> Self {
        Self {
            file: file.to_path_buf(),
            artifact_id: artifact.artifact_id.clone(),
            classifier: artifact.classifier.clone(),
            has_descriptor_metadata: artifact.has_descriptor_metadata(),
            repository_id: repository_id.to_string(),
        }
    }

    /// File name of the recorded call
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Deployer that records calls in order and can fail on the nth call
#[derive(Debug, Default)]
pub struct RecordingDeployer {
    calls: Mutex<Vec<RecordedCall>>,
    /// 1-based index of the call that fails; the failing call is recorded
    fail_on_call: Option<usize>,
}

impl RecordingDeployer {
    /// Deployer that succeeds on every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Deployer that fails on the nth call (1-based)
    pub fn failing_on_call(n: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(n),
        }
    }

    /// Calls observed so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactDeployer for RecordingDeployer {
    async fn deploy(
        &self,
        file: &Path,
        artifact: &NativeArtifact,
        repository: &dyn RemoteRepository,
        _local_repository: &dyn LocalRepository,
    ) -> Result<(), DeploymentError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall::from_artifact(artifact, file, repository.id()));
            calls.len()
        };

        if self.fail_on_call == Some(call_index) {
            return Err(DeploymentError {
                repository: repository.id().to_string(),
                file: artifact.file_name(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Installer that records calls in order and can fail on the nth call
#[derive(Debug, Default)]
pub struct RecordingInstaller {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on_call: Option<usize>,
}

impl RecordingInstaller {
    /// Installer that succeeds on every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Installer that fails on the nth call (1-based)
    pub fn failing_on_call(n: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(n),
        }
    }

    /// Calls observed so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactInstaller for RecordingInstaller {
    async fn install(
        &self,
        file: &Path,
        artifact: &NativeArtifact,
        _local_repository: &dyn LocalRepository,
    ) -> Result<(), InstallationError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall::from_artifact(artifact, file, "local"));
            calls.len()
        };

        if self.fail_on_call == Some(call_index) {
            return Err(InstallationError {
                file: artifact.file_name(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Remote repository handle with an observable unique-versions setting
#[derive(Debug)]
pub struct MockRemoteRepository {
    id: String,
    url: String,
    unique_versions: AtomicBool,
    set_calls: Mutex<Vec<bool>>,
}

impl MockRemoteRepository {
    /// Create a repository configured with the given unique-versions setting
    pub fn new(id: impl Into<String>, unique_versions: bool) -> Self {
        Self {
            id: id.into(),
            url: "https://repo.example.test/releases/".to_string(),
            unique_versions: AtomicBool::new(unique_versions),
            set_calls: Mutex::new(Vec::new()),
        }
    }

    /// Values passed to `set_unique_versions`, in order.
    ///
    /// Empty means the operation left the setting untouched.
    pub fn set_calls(&self) -> Vec<bool> {
        self.set_calls.lock().unwrap().clone()
    }
}

impl RemoteRepository for MockRemoteRepository {
    fn id(&self) -> &str {
        &self.id
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn unique_versions(&self) -> bool {
        self.unique_versions.load(Ordering::SeqCst)
    }

    fn set_unique_versions(&self, unique: bool) {
        self.unique_versions.store(unique, Ordering::SeqCst);
        self.set_calls.lock().unwrap().push(unique);
    }
}

/// Local repository rooted at a fixed directory
#[derive(Debug)]
pub struct MockLocalRepository {
    root: PathBuf,
}

impl MockLocalRepository {
    /// Create a local repository handle over `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for MockLocalRepository {
    fn default() -> Self {
        Self::new("/tmp/armory-local-repository")
    }
}

impl LocalRepository for MockLocalRepository {
    fn root(&self) -> &Path {
        &self.root
    }
}

/// Log sink collecting lines in memory
#[derive(Debug, Default)]
pub struct BufferLogSink {
    lines: Mutex<Vec<String>>,
}

impl BufferLogSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines received so far, in order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for BufferLogSink {
    fn line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// One observed fingerprint request
#[derive(Debug, Clone)]
pub struct FingerprintRequest {
    /// File that was fingerprinted
    pub file: PathBuf,
    /// Hex digest handed to the store
    pub sha256: String,
}

/// Fingerprint store that records requests and can fail on the nth one
#[derive(Debug, Default)]
pub struct MockFingerprintStore {
    requests: Mutex<Vec<FingerprintRequest>>,
    /// 1-based index of the request that fails; the failing request is NOT
    /// recorded, mirroring a store that never persisted it
    fail_on_request: Option<usize>,
}

impl MockFingerprintStore {
    /// Store that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that fails on the nth request (1-based)
    pub fn failing_on_request(n: usize) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on_request: Some(n),
        }
    }

    /// Requests observed so far, in order
    pub fn requests(&self) -> Vec<FingerprintRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FingerprintStore for MockFingerprintStore {
    async fn record(&self, file: &Path, _build: &BuildRef, sha256: &str) -> io::Result<()> {
        let mut requests = self.requests.lock().unwrap();
        if self.fail_on_request == Some(requests.len() + 1) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "injected fingerprint store failure",
            ));
        }
        requests.push(FingerprintRequest {
            file: file.to_path_buf(),
            sha256: sha256.to_string(),
        });
        Ok(())
    }
}

/// Toolchain lookup surface over the mock capabilities.
///
/// Records every requested deployer strategy and can be told to report a
/// capability as missing.
pub struct MockToolchain {
    /// Type handler registry handed out by lookups
    pub handler_registry: Arc<MockHandlerRegistry>,
    /// Native artifact factory handed out by lookups
    pub artifact_factory: Arc<MockArtifactFactory>,
    /// Recording deployer handed out for every strategy
    pub deployer: Arc<RecordingDeployer>,
    /// Recording installer
    pub installer: Arc<RecordingInstaller>,
    /// Local repository context
    pub local_repository: Arc<MockLocalRepository>,
    requested_strategies: Mutex<Vec<DeployStrategy>>,
    missing_capabilities: Vec<&'static str>,
}

impl MockToolchain {
    /// Toolchain with every capability available
    pub fn new() -> Self {
        Self::with_deployer(RecordingDeployer::new())
    }

    /// Toolchain wired with a specific deployer fake
    pub fn with_deployer(deployer: RecordingDeployer) -> Self {
        Self {
            handler_registry: Arc::new(MockHandlerRegistry),
            artifact_factory: Arc::new(MockArtifactFactory),
            deployer: Arc::new(deployer),
            installer: Arc::new(RecordingInstaller::new()),
            local_repository: Arc::new(MockLocalRepository::default()),
            requested_strategies: Mutex::new(Vec::new()),
            missing_capabilities: Vec::new(),
        }
    }

    /// Toolchain wired with a specific installer fake
    pub fn with_installer(installer: RecordingInstaller) -> Self {
        let mut toolchain = Self::new();
        toolchain.installer = Arc::new(installer);
        toolchain
    }

    /// Report the named capability as unavailable
    pub fn without(mut self, capability: &'static str) -> Self {
        self.missing_capabilities.push(capability);
        self
    }

    /// Deployer strategies requested so far, in order
    pub fn requested_strategies(&self) -> Vec<DeployStrategy> {
        self.requested_strategies.lock().unwrap().clone()
    }

    fn check(&self, capability: &'static str) -> Result<(), LookupError> {
        if self.missing_capabilities.contains(&capability) {
            return Err(LookupError::Missing { capability });
        }
        Ok(())
    }
}

impl Default for MockToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for MockToolchain {
    fn handler_registry(&self) -> Result<Arc<dyn HandlerRegistry>, LookupError> {
        self.check("handler registry")?;
        Ok(self.handler_registry.clone())
    }

    fn artifact_factory(&self) -> Result<Arc<dyn ArtifactFactory>, LookupError> {
        self.check("artifact factory")?;
        Ok(self.artifact_factory.clone())
    }

    fn deployer(&self, strategy: DeployStrategy) -> Result<Arc<dyn ArtifactDeployer>, LookupError> {
        self.requested_strategies.lock().unwrap().push(strategy);
        if self.missing_capabilities.contains(&"deployer") {
            return Err(LookupError::MissingQualified {
                capability: "deployer",
                qualifier: strategy.key().to_string(),
            });
        }
        Ok(self.deployer.clone())
    }

    fn installer(&self) -> Result<Arc<dyn ArtifactInstaller>, LookupError> {
        self.check("installer")?;
        Ok(self.installer.clone())
    }

    fn local_repository(&self) -> Result<Arc<dyn LocalRepository>, LookupError> {
        self.check("local repository")?;
        Ok(self.local_repository.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_tracks_set_calls() {
        let repository = MockRemoteRepository::new("releases", false);
        assert!(!repository.unique_versions());
        assert!(repository.set_calls().is_empty());

        repository.set_unique_versions(true);
        assert!(repository.unique_versions());
        assert_eq!(repository.set_calls(), vec![true]);
    }

    #[test]
    fn test_toolchain_reports_missing_capability() {
        let toolchain = MockToolchain::new().without("artifact factory");

        assert!(toolchain.handler_registry().is_ok());
        assert!(matches!(
            toolchain.artifact_factory(),
            Err(LookupError::Missing { capability: "artifact factory" })
        ));
    }

    #[test]
    fn test_toolchain_records_requested_strategies() {
        let toolchain = MockToolchain::new();
        toolchain.deployer(DeployStrategy::Legacy).unwrap();
        toolchain.deployer(DeployStrategy::Default).unwrap();

        assert_eq!(
            toolchain.requested_strategies(),
            vec![DeployStrategy::Legacy, DeployStrategy::Default]
        );
    }

    #[tokio::test]
    async fn test_recording_deployer_failure_injection() {
        let deployer = RecordingDeployer::failing_on_call(2);
        let repository = MockRemoteRepository::new("releases", true);
        let local = MockLocalRepository::default();
        let artifact = NativeArtifact {
            group_id: "com.acme".to_string(),
            artifact_id: "core".to_string(),
            version: "1.4.0".to_string(),
            packaging: "lib".to_string(),
            classifier: None,
            extension: "lib".to_string(),
            file: PathBuf::from("/archive/core-1.4.0.lib"),
            metadata: Vec::new(),
        };

        assert!(deployer
            .deploy(&artifact.file, &artifact, &repository, &local)
            .await
            .is_ok());
        assert!(deployer
            .deploy(&artifact.file, &artifact, &repository, &local)
            .await
            .is_err());
        assert_eq!(deployer.calls().len(), 2);
    }
}
