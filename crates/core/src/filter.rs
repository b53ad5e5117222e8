use std::path::Path;

/// Decides which files a step applies to.
pub trait FileFilter: Send + Sync {
  /// Stable identifier for this filter. It is part of the step's signature.
  fn id(&self) -> String;
  fn accept(&self, file_path: &Path) -> bool;
}

/// Rejects files by exact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeFileNames {
  file_names: Vec<String>,
}

impl ExcludeFileNames {
  pub fn new(file_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
    ExcludeFileNames {
      file_names: file_names.into_iter().map(Into::into).collect(),
    }
  }
}

impl FileFilter for ExcludeFileNames {
  fn id(&self) -> String {
    format!("excludeFileNames({})", self.file_names.join(","))
  }

  fn accept(&self, file_path: &Path) -> bool {
    match file_path.file_name() {
      Some(file_name) => !self.file_names.iter().any(|name| file_name == name.as_str()),
      None => true,
    }
  }
}
