use std::path::Path;

use anyhow::Result;

/// A realized formatting function.
///
/// Implementations must be callable from many threads at once.
pub trait FormatterFunc: Send + Sync {
  fn apply(&self, input: &str) -> Result<String>;

  /// Formats with knowledge of the file being formatted.
  ///
  /// Defaults to ignoring the path.
  fn apply_with_file(&self, input: &str, _file_path: &Path) -> Result<String> {
    self.apply(input)
  }
}

impl<F> FormatterFunc for F
where
  F: Fn(&str) -> Result<String> + Send + Sync,
{
  fn apply(&self, input: &str) -> Result<String> {
    self(input)
  }
}
