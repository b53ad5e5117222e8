use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use indexmap::IndexMap;
use parking_lot::Mutex;

use super::Environment;

/// In-memory environment for tests.
#[derive(Clone)]
pub struct TestEnvironment {
  files: Arc<Mutex<IndexMap<PathBuf, Vec<u8>>>>,
  git_responses: Arc<Mutex<IndexMap<(PathBuf, String), String>>>,
  git_invocations: Arc<Mutex<Vec<String>>>,
  stderr_messages: Arc<Mutex<Vec<String>>>,
  current_year: Arc<Mutex<i32>>,
  is_debug: Arc<Mutex<bool>>,
}

impl Default for TestEnvironment {
  fn default() -> Self {
    Self::new()
  }
}

impl TestEnvironment {
  pub fn new() -> Self {
    TestEnvironment {
      files: Default::default(),
      git_responses: Default::default(),
      git_invocations: Default::default(),
      stderr_messages: Default::default(),
      current_year: Arc::new(Mutex::new(2026)),
      is_debug: Default::default(),
    }
  }

  pub fn write_file(&self, file_path: impl AsRef<Path>, text: &str) {
    self.write_file_bytes(file_path, text.as_bytes());
  }

  pub fn write_file_bytes(&self, file_path: impl AsRef<Path>, bytes: &[u8]) {
    self.files.lock().insert(file_path.as_ref().to_path_buf(), bytes.to_vec());
  }

  pub fn set_current_year(&self, year: i32) {
    *self.current_year.lock() = year;
  }

  pub fn set_debug(&self, value: bool) {
    *self.is_debug.lock() = value;
  }

  /// Registers the stdout returned when `git` runs with `args` in `cwd`.
  pub fn add_git_response(&self, cwd: impl AsRef<Path>, args: &[&str], stdout: &str) {
    self
      .git_responses
      .lock()
      .insert((cwd.as_ref().to_path_buf(), args.join(" ")), stdout.to_string());
  }

  pub fn git_invocations(&self) -> Vec<String> {
    self.git_invocations.lock().clone()
  }

  pub fn take_stderr_messages(&self) -> Vec<String> {
    std::mem::take(&mut *self.stderr_messages.lock())
  }
}

impl Environment for TestEnvironment {
  fn read_file_bytes(&self, file_path: &Path) -> Result<Vec<u8>> {
    match self.files.lock().get(file_path) {
      Some(bytes) => Ok(bytes.clone()),
      None => bail!("Error reading file {}: file not found", file_path.display()),
    }
  }

  fn path_exists(&self, file_path: &Path) -> bool {
    let files = self.files.lock();
    files.contains_key(file_path) || files.keys().any(|path| path.starts_with(file_path))
  }

  fn current_year(&self) -> i32 {
    *self.current_year.lock()
  }

  fn run_git(&self, cwd: &Path, args: &[&str]) -> Result<String> {
    let args = args.join(" ");
    self.git_invocations.lock().push(args.clone());
    match self.git_responses.lock().get(&(cwd.to_path_buf(), args)) {
      Some(stdout) => Ok(stdout.clone()),
      None => bail!("fatal: not a git repository (or any of the parent directories): .git"),
    }
  }

  fn log_stderr(&self, text: &str) {
    self.stderr_messages.lock().push(text.to_string());
  }

  fn is_debug(&self) -> bool {
    *self.is_debug.lock()
  }
}
