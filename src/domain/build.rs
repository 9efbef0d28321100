//! References to the owning build.
//!
//! The record never manages a build's lifecycle; it only keeps the data it
//! needs to resolve archived files, report URLs, and pick the toolchain
//! compatibility mode. The build engine constructs these references when the
//! build completes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Toolchain generations whose deployment behavior differs.
///
/// The split exists because the modern toolchain dropped support for
/// non-unique (non-timestamped) snapshot versions; see
/// [`ArtifactRecord::deploy`](crate::domain::record::ArtifactRecord::deploy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolchainMode {
    /// Major versions before [`MODERN_MAJOR`]
    Legacy,

    /// [`MODERN_MAJOR`] and later
    Modern,
}

/// First toolchain major version with modern deployment behavior
pub const MODERN_MAJOR: u32 = 3;

impl ToolchainMode {
    /// Derive the mode from a recorded toolchain version string.
    ///
    /// Unparseable versions are treated as modern, which keeps deployment on
    /// the strategy every toolchain generation supports.
    pub fn from_version(version: &str) -> Self {
        let major = version
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok());

        match major {
            Some(major) if major < MODERN_MAJOR => Self::Legacy,
            _ => Self::Modern,
        }
    }
}

/// Reference to the multi-module (module set) build that ran the toolchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSetBuildRef {
    /// Toolchain version the build ran with (e.g. "3.9.6")
    pub toolchain_version: String,

    /// URL fragment of the module set build, ends with '/'
    pub url: String,
}

impl ModuleSetBuildRef {
    /// Create a new module set build reference
    pub fn new(toolchain_version: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            toolchain_version: toolchain_version.into(),
            url: url.into(),
        }
    }

    /// Compatibility mode of the toolchain this build ran with
    pub fn toolchain_mode(&self) -> ToolchainMode {
        ToolchainMode::from_version(&self.toolchain_version)
    }
}

/// Reference to the single module build that produced the artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRef {
    /// Unique identifier of the build execution
    pub id: Uuid,

    /// Build number within the module's build history
    pub number: u32,

    /// Name of the module this build belongs to
    pub module_name: String,

    /// Directory the build engine archived this build's output files under
    pub archive_root: PathBuf,

    /// URL fragment of the build, ends with '/'
    pub url: String,

    /// The module set build this module build ran as part of
    pub module_set: ModuleSetBuildRef,
}

impl BuildRef {
    /// Resolve an archive-relative path against this build's archive root
    pub fn archive_file(&self, archive_path: &str) -> PathBuf {
        self.archive_root.join(archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_version() {
        assert_eq!(ToolchainMode::from_version("2.2.1"), ToolchainMode::Legacy);
        assert_eq!(ToolchainMode::from_version("2.0"), ToolchainMode::Legacy);
        assert_eq!(ToolchainMode::from_version("3.0.5"), ToolchainMode::Modern);
        assert_eq!(ToolchainMode::from_version("3.9.6"), ToolchainMode::Modern);
        assert_eq!(ToolchainMode::from_version("4.0.0-rc-1"), ToolchainMode::Modern);
    }

    #[test]
    fn test_unparseable_version_is_modern() {
        assert_eq!(ToolchainMode::from_version(""), ToolchainMode::Modern);
        assert_eq!(ToolchainMode::from_version("unknown"), ToolchainMode::Modern);
    }

    #[test]
    fn test_archive_file_resolution() {
        let build = BuildRef {
            id: Uuid::new_v4(),
            number: 12,
            module_name: "core".to_string(),
            archive_root: PathBuf::from("/var/builds/core/12/archive"),
            url: "job/core/12/".to_string(),
            module_set: ModuleSetBuildRef::new("3.9.6", "job/acme/12/"),
        };

        assert_eq!(
            build.archive_file("core/core-1.4.0.tgz"),
            PathBuf::from("/var/builds/core/12/archive/core/core-1.4.0.tgz")
        );
    }
}
