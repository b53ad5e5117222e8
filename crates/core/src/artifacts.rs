use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::environment::Environment;
use crate::get_sha256_checksum;
use crate::StepError;

/// Resolves artifact coordinates to a transitively complete set of files.
///
/// Implementations must be deterministic for equal coordinates within a build.
pub trait Provisioner: Send + Sync {
  fn resolve(&self, coordinate: &str) -> Result<Vec<PathBuf>>;
}

impl<F> Provisioner for F
where
  F: Fn(&str) -> Result<Vec<PathBuf>> + Send + Sync,
{
  fn resolve(&self, coordinate: &str) -> Result<Vec<PathBuf>> {
    self(coordinate)
  }
}

/// A single resolved artifact. Identified by its file name and checksum.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
  file_name: String,
  checksum: String,
  #[serde(skip)]
  path: PathBuf,
}

impl Artifact {
  pub fn file_name(&self) -> &str {
    &self.file_name
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl PartialEq for Artifact {
  fn eq(&self, other: &Self) -> bool {
    self.file_name == other.file_name && self.checksum == other.checksum
  }
}

impl Eq for Artifact {}

impl Hash for Artifact {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.file_name.hash(state);
    self.checksum.hash(state);
  }
}

/// The resolved artifacts for a coordinate.
///
/// Equality and serialization ignore where the artifacts were found on
/// disk so that steps stay stable across machines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactState {
  coordinate: String,
  artifacts: Vec<Artifact>,
}

impl ArtifactState {
  pub fn from(coordinate: &str, provisioner: &dyn Provisioner, environment: &impl Environment) -> Result<Self> {
    let files = provisioner
      .resolve(coordinate)
      .map_err(|err| err.context(StepError::Resolution(coordinate.to_string())))?;
    if files.is_empty() {
      return Err(
        anyhow::anyhow!("The provisioner returned no artifacts.").context(StepError::Resolution(coordinate.to_string())),
      );
    }

    let mut artifacts = Vec::with_capacity(files.len());
    for path in files {
      let bytes = environment
        .read_file_bytes(&path)
        .map_err(|err| err.context(StepError::Resolution(coordinate.to_string())))?;
      artifacts.push(Artifact {
        file_name: path
          .file_name()
          .map(|name| name.to_string_lossy().to_string())
          .unwrap_or_else(|| path.display().to_string()),
        checksum: get_sha256_checksum(&bytes),
        path,
      });
    }
    log_debug!(environment, "Resolved {} artifact(s) for {}", artifacts.len(), coordinate);

    Ok(ArtifactState {
      coordinate: coordinate.to_string(),
      artifacts,
    })
  }

  pub fn coordinate(&self) -> &str {
    &self.coordinate
  }

  pub fn artifacts(&self) -> &[Artifact] {
    &self.artifacts
  }
}
