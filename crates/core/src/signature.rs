use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Result;
use serde::Serialize;

use crate::environment::Environment;
use crate::get_sha256_checksum;

/// Content-addressed fingerprint of a list of files.
///
/// Only the file contents take part in equality, so two signatures over
/// files with equal bytes are equal even when the files live elsewhere.
#[derive(Debug, Clone, Serialize)]
pub struct FileSignature {
  #[serde(skip)]
  files: Vec<PathBuf>,
  checksums: Vec<String>,
}

impl FileSignature {
  pub fn empty() -> Self {
    FileSignature {
      files: Vec::new(),
      checksums: Vec::new(),
    }
  }

  /// Signs the files in the order provided, keeping duplicates.
  pub fn sign_as_list(files: impl IntoIterator<Item = PathBuf>, environment: &impl Environment) -> Result<Self> {
    let mut signature = FileSignature::empty();
    for file in files {
      let bytes = environment.read_file_bytes(&file)?;
      signature.checksums.push(get_sha256_checksum(&bytes));
      signature.files.push(file);
    }
    Ok(signature)
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  pub fn only_file(&self) -> Result<&Path> {
    match self.files.as_slice() {
      [file] => Ok(file),
      files => bail!("Expected the signature to hold exactly one file, but it held {}.", files.len()),
    }
  }
}

impl PartialEq for FileSignature {
  fn eq(&self, other: &Self) -> bool {
    self.checksums == other.checksums
  }
}

impl Eq for FileSignature {}

impl Hash for FileSignature {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.checksums.hash(state);
  }
}
