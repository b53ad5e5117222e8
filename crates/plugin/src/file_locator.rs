use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use stepfmt_core::environment::Environment;
use stepfmt_core::StepError;

/// Resolves user supplied file references against the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocator {
  base_dir: PathBuf,
}

impl FileLocator {
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    FileLocator { base_dir: base_dir.into() }
  }

  pub fn base_dir(&self) -> &Path {
    &self.base_dir
  }

  pub fn locate_file(&self, path: &str, environment: &impl Environment) -> Result<PathBuf> {
    let file_path = self.base_dir.join(path);
    if environment.path_exists(&file_path) {
      Ok(file_path)
    } else {
      Err(StepError::Config(format!("Could not find file '{}' (resolved to {}).", path, file_path.display())).into())
    }
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;
  use stepfmt_core::environment::TestEnvironment;

  use super::*;

  #[test]
  fn locates_relative_and_absolute_files() {
    let environment = TestEnvironment::new();
    environment.write_file("/project/config/license.txt", "MIT");
    environment.write_file("/shared/license.txt", "MIT");
    let locator = FileLocator::new("/project");
    assert_eq!(locator.base_dir(), Path::new("/project"));
    assert_eq!(
      locator.locate_file("config/license.txt", &environment).unwrap(),
      PathBuf::from("/project/config/license.txt")
    );
    assert_eq!(locator.locate_file("/shared/license.txt", &environment).unwrap(), PathBuf::from("/shared/license.txt"));
  }

  #[test]
  fn missing_file_is_config_error() {
    let environment = TestEnvironment::new();
    let err = FileLocator::new("/project").locate_file("license.txt", &environment).unwrap_err();
    assert_eq!(
      StepError::find(&err),
      Some(&StepError::Config("Could not find file 'license.txt' (resolved to /project/license.txt).".to_string()))
    );
  }
}
