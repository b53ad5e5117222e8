use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::Datelike;
use parking_lot::Mutex;

use super::Environment;

#[derive(Clone, Debug, Default)]
pub struct RealEnvironmentOptions {
  pub is_debug: bool,
}

#[derive(Clone)]
pub struct RealEnvironment {
  output_lock: Arc<Mutex<()>>,
  is_debug: bool,
}

impl RealEnvironment {
  pub fn new(options: &RealEnvironmentOptions) -> Self {
    RealEnvironment {
      output_lock: Default::default(),
      is_debug: options.is_debug,
    }
  }
}

impl Environment for RealEnvironment {
  fn read_file_bytes(&self, file_path: &Path) -> Result<Vec<u8>> {
    log_debug!(self, "Reading file: {}", file_path.display());
    std::fs::read(file_path).with_context(|| format!("Error reading file {}", file_path.display()))
  }

  fn path_exists(&self, file_path: &Path) -> bool {
    log_debug!(self, "Checking path exists: {}", file_path.display());
    file_path.exists()
  }

  fn current_year(&self) -> i32 {
    chrono::Local::now().year()
  }

  fn run_git(&self, cwd: &Path, args: &[&str]) -> Result<String> {
    log_debug!(self, "Running git {} in {}", args.join(" "), cwd.display());
    let output = Command::new("git")
      .args(args)
      .current_dir(cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .output()
      .context("Error starting git. Is it installed and on the path?")?;
    if !output.status.success() {
      bail!("Error running git {}: {}", args.join(" "), String::from_utf8_lossy(&output.stderr).trim());
    }
    Ok(String::from_utf8(output.stdout)?)
  }

  fn log_stderr(&self, text: &str) {
    let _guard = self.output_lock.lock();
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", text);
  }

  fn is_debug(&self) -> bool {
    self.is_debug
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn reads_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("header.txt");
    std::fs::write(&file_path, "/* (C) $YEAR */").unwrap();

    let environment = RealEnvironment::new(&Default::default());
    assert!(environment.path_exists(&file_path));
    assert_eq!(environment.read_file(&file_path).unwrap(), "/* (C) $YEAR */");
    let err = environment.read_file(&dir.path().join("missing.txt")).unwrap_err();
    assert!(err.to_string().starts_with("Error reading file"));
  }

  #[test]
  fn current_year_is_plausible() {
    let environment = RealEnvironment::new(&Default::default());
    assert!(environment.current_year() >= 2024);
  }
}
