use std::path::Path;

use anyhow::Result;

/// Everything a step needs from the outside world.
///
/// Steps only touch the file system, the clock and `git` through this
/// trait so that they can be exercised against an in-memory environment.
pub trait Environment: Clone + Send + Sync + 'static {
  fn read_file_bytes(&self, file_path: &Path) -> Result<Vec<u8>>;
  fn read_file(&self, file_path: &Path) -> Result<String> {
    let bytes = self.read_file_bytes(file_path)?;
    Ok(String::from_utf8(bytes)?)
  }
  fn path_exists(&self, file_path: &Path) -> bool;
  fn current_year(&self) -> i32;
  /// Runs `git` with the provided arguments in `cwd` and returns stdout.
  fn run_git(&self, cwd: &Path, args: &[&str]) -> Result<String>;
  fn log_stderr(&self, text: &str);
  fn is_debug(&self) -> bool;
}

// use a macro here so the expression provided is only evaluated when in debug mode
#[macro_export]
macro_rules! log_debug {
  ($environment:expr, $($arg:tt)*) => {
    if $environment.is_debug() {
      let mut text = String::from("[DEBUG] ");
      text.push_str(&format!($($arg)*));
      $environment.log_stderr(&text);
    }
  }
}
