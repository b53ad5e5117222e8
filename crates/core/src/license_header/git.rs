use std::path::Path;

use anyhow::bail;
use anyhow::Result;

use crate::environment::Environment;

/// Author years of the first and last commits touching a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitYears {
  pub oldest: i32,
  pub newest: i32,
}

/// Looks up the commit years of a file from git history.
///
/// Returns `None` when the file has no history yet.
pub fn file_commit_years(environment: &impl Environment, file_path: &Path) -> Result<Option<CommitYears>> {
  let cwd = match file_path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  let Some(file_name) = file_path.file_name() else {
    bail!("Expected a file path, but got {}", file_path.display());
  };
  let file_name = file_name.to_string_lossy().to_string();

  let added = environment.run_git(
    cwd,
    &["log", "--follow", "--find-renames=40%", "--diff-filter=A", "--format=%aI", "--", file_name.as_str()],
  )?;
  let latest = environment.run_git(cwd, &["log", "--max-count=1", "--format=%aI", "--", file_name.as_str()])?;

  // log output is newest first so the earliest add is the last line
  let oldest = non_empty_lines(&added).last().map(parse_year).transpose()?;
  let newest = non_empty_lines(&latest).next().map(parse_year).transpose()?;
  Ok(match (oldest, newest) {
    (Some(oldest), Some(newest)) => Some(CommitYears { oldest, newest }),
    (Some(year), None) | (None, Some(year)) => Some(CommitYears { oldest: year, newest: year }),
    (None, None) => None,
  })
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
  text.lines().map(|line| line.trim()).filter(|line| !line.is_empty())
}

fn parse_year(line: &str) -> Result<i32> {
  match line.get(..4).and_then(|year| year.parse::<i32>().ok()) {
    Some(year) => Ok(year),
    None => bail!("Unable to parse a year from git output: {}", line),
  }
}
