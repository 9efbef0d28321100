//! The per-build artifact record.
//!
//! One [`ArtifactRecord`] is constructed per build execution, at or after
//! build completion, and is immutable afterward. It owns the descriptor
//! artifact, the main artifact, and the ordered attached artifacts as one
//! logical unit; the deploy/install/fingerprint operations over it live in
//! [`crate::core`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::Artifact;
use super::build::{BuildRef, ModuleSetBuildRef};

/// Artifacts remembered for one build execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// The build these artifacts were produced by (back-reference only)
    build: BuildRef,

    /// When the record was constructed
    created_at: DateTime<Utc>,

    /// Project descriptor artifact
    descriptor: Artifact,

    /// Main artifact. For a descriptor-only module this holds the same value
    /// as the descriptor artifact, so downstream code keeps a single path.
    main: Artifact,

    /// Attached artifacts in build insertion order. Can be empty but never
    /// null; the order is preserved through deploy and install.
    attached: Vec<Artifact>,
}

impl ArtifactRecord {
    /// Create the record for a completed build.
    ///
    /// When the build produced no distinct main artifact, pass `None` and the
    /// descriptor artifact takes its place. The defaulting happens here, once;
    /// every operation over the record assumes the main artifact is present.
    pub fn new(
        build: BuildRef,
        descriptor: Artifact,
        main: Option<Artifact>,
        attached: Vec<Artifact>,
    ) -> Self {
        let main = main.unwrap_or_else(|| descriptor.clone());
        Self {
            build,
            created_at: Utc::now(),
            descriptor,
            main,
            attached,
        }
    }

    /// The owning build
    pub fn build(&self) -> &BuildRef {
        &self.build
    }

    /// When the record was constructed
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The project descriptor artifact
    pub fn descriptor_artifact(&self) -> &Artifact {
        &self.descriptor
    }

    /// The main artifact
    pub fn main_artifact(&self) -> &Artifact {
        &self.main
    }

    /// Attached artifacts in build insertion order
    pub fn attached_artifacts(&self) -> &[Artifact] {
        &self.attached
    }

    /// Whether this module produced only a descriptor and no binary artifact.
    ///
    /// True iff the main artifact and the descriptor artifact carry the same
    /// coordinates, which is exactly the constructor's defaulting case.
    pub fn is_descriptor_only(&self) -> bool {
        self.main.same_coordinates(&self.descriptor)
    }

    /// URL fragment of this record relative to the application root.
    ///
    /// Ends with '/'. Presentation of the record is the web layer's job; this
    /// only anchors where it reports.
    pub fn url(&self) -> String {
        format!("{}artifacts/", self.build.url)
    }

    /// Collect per-module records into the aggregated multi-module view.
    ///
    /// The aggregate is a reporting handle; deploying or installing through it
    /// is the aggregation layer's concern, not this record's.
    pub fn create_aggregated_view(
        module_set: ModuleSetBuildRef,
        module_records: Vec<ArtifactRecord>,
    ) -> AggregatedArtifactRecord {
        AggregatedArtifactRecord {
            module_set,
            records: module_records,
        }
    }
}

/// Aggregated view over the artifact records of one module set build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedArtifactRecord {
    module_set: ModuleSetBuildRef,
    records: Vec<ArtifactRecord>,
}

impl AggregatedArtifactRecord {
    /// The module set build this view aggregates
    pub fn module_set(&self) -> &ModuleSetBuildRef {
        &self.module_set
    }

    /// Per-module records in aggregation order
    pub fn records(&self) -> &[ArtifactRecord] {
        &self.records
    }

    /// URL fragment of the aggregated view, ends with '/'
    pub fn url(&self) -> String {
        format!("{}artifacts/", self.module_set.url)
    }
}
