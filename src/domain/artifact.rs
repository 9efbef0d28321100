//! Artifacts produced by one build execution.
//!
//! An [`Artifact`] is an immutable description of a single physical build
//! output: its repository coordinates plus a reference to the archived file.
//! The file reference is relative to the owning build's archive root and is
//! only resolved against a [`BuildRef`](super::build::BuildRef) at operation
//! time, never stored as an absolute path.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::build::BuildRef;

/// Packaging value under which the toolchain publishes project descriptors.
pub const DESCRIPTOR_PACKAGING: &str = "descriptor";

/// One physical build output with its repository coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Group identifier
    pub group_id: String,

    /// Artifact identifier
    pub artifact_id: String,

    /// Version
    pub version: String,

    /// Packaging/type (e.g. "lib", "bundle", or [`DESCRIPTOR_PACKAGING`])
    pub packaging: String,

    /// Optional classifier (e.g. "sources")
    pub classifier: Option<String>,

    /// Name of the file as the build engine produced it
    pub file_name: String,

    /// Path of the archived file relative to the owning build's archive root
    pub archive_path: String,
}

impl Artifact {
    /// Create a new artifact without a classifier
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        packaging: impl Into<String>,
        file_name: impl Into<String>,
        archive_path: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: packaging.into(),
            classifier: None,
            file_name: file_name.into(),
            archive_path: archive_path.into(),
        }
    }

    /// Attach a classifier to the coordinates
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Whether this artifact is a project descriptor
    pub fn is_descriptor(&self) -> bool {
        self.packaging == DESCRIPTOR_PACKAGING
    }

    /// Whether another artifact carries the same repository coordinates
    pub fn same_coordinates(&self, other: &Artifact) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
            && self.packaging == other.packaging
            && self.classifier == other.classifier
    }

    /// File extension, taken from the produced file name when it has one,
    /// falling back to the packaging
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => &self.packaging,
        }
    }

    /// Canonical repository file name: `artifact-version[-classifier].ext`
    pub fn canonical_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id,
                self.version,
                classifier,
                self.extension()
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension()),
        }
    }

    /// Locate the physical file within the owning build's archive.
    ///
    /// A missing file is a resolution error and is propagated to the caller.
    pub fn file(&self, build: &BuildRef) -> io::Result<PathBuf> {
        let path = build.archive_file(&self.archive_path);
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "archived artifact '{}' not found under {}",
                    self.archive_path,
                    build.archive_root.display()
                ),
            ));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        let artifact = Artifact::new(
            "com.acme",
            "core",
            "1.4.0",
            "lib",
            "core-1.4.0.tgz",
            "core/core-1.4.0.tgz",
        );
        assert_eq!(artifact.canonical_name(), "core-1.4.0.tgz");

        let sources = artifact.clone().with_classifier("sources");
        assert_eq!(sources.canonical_name(), "core-1.4.0-sources.tgz");
    }

    #[test]
    fn test_extension_falls_back_to_packaging() {
        let artifact = Artifact::new("com.acme", "core", "1.4.0", "lib", "core", "core/core");
        assert_eq!(artifact.extension(), "lib");
    }

    #[test]
    fn test_descriptor_detection() {
        let descriptor = Artifact::new(
            "com.acme",
            "core",
            "1.4.0",
            DESCRIPTOR_PACKAGING,
            "project.yaml",
            "core/project.yaml",
        );
        assert!(descriptor.is_descriptor());

        let binary = Artifact::new(
            "com.acme",
            "core",
            "1.4.0",
            "lib",
            "core-1.4.0.tgz",
            "core/core-1.4.0.tgz",
        );
        assert!(!binary.is_descriptor());
    }

    #[test]
    fn test_same_coordinates_ignores_file_reference() {
        let a = Artifact::new(
            "com.acme",
            "core",
            "1.4.0",
            "lib",
            "core-1.4.0.tgz",
            "core/core-1.4.0.tgz",
        );
        let b = Artifact::new(
            "com.acme",
            "core",
            "1.4.0",
            "lib",
            "renamed.tgz",
            "elsewhere/renamed.tgz",
        );
        assert!(a.same_coordinates(&b));

        let c = b.clone().with_classifier("sources");
        assert!(!a.same_coordinates(&c));
    }

    #[test]
    fn test_artifact_serialization() {
        let artifact = Artifact::new(
            "com.acme",
            "core",
            "1.4.0",
            "lib",
            "core-1.4.0.tgz",
            "core/core-1.4.0.tgz",
        )
        .with_classifier("sources");

        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: Artifact = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, artifact);
    }
}
