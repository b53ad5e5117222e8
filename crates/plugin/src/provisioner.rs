use std::collections::HashSet;
use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use stepfmt_core::environment::Environment;
use stepfmt_core::log_debug;
use stepfmt_core::Provisioner;

/// Resolves coordinates from a local repository laid out like a maven repository.
///
/// `group:artifact:version` resolves to
/// `<root>/group/as/path/artifact/version/artifact-version.wasm`. A sibling
/// `artifact-version.deps` file lists the coordinates it depends on, one
/// per line.
#[derive(Clone)]
pub struct DirectoryProvisioner<TEnvironment: Environment> {
  root: PathBuf,
  environment: TEnvironment,
}

struct Coordinate<'a> {
  group: &'a str,
  artifact: &'a str,
  version: &'a str,
}

impl<'a> Coordinate<'a> {
  fn parse(text: &'a str) -> Result<Self> {
    let parts = text.split(':').collect::<Vec<_>>();
    match parts.as_slice() {
      [group, artifact, version] if !group.is_empty() && !artifact.is_empty() && !version.is_empty() => Ok(Coordinate {
        group: *group,
        artifact: *artifact,
        version: *version,
      }),
      _ => bail!("Expected a coordinate in the form 'group:artifact:version', but got '{}'.", text),
    }
  }
}

impl<TEnvironment: Environment> DirectoryProvisioner<TEnvironment> {
  pub fn new(root: impl Into<PathBuf>, environment: TEnvironment) -> Self {
    DirectoryProvisioner {
      root: root.into(),
      environment,
    }
  }

  fn artifact_dir(&self, coordinate: &Coordinate) -> PathBuf {
    let mut dir = self.root.clone();
    for part in coordinate.group.split('.') {
      dir.push(part);
    }
    dir.push(coordinate.artifact);
    dir.push(coordinate.version);
    dir
  }
}

impl<TEnvironment: Environment> Provisioner for DirectoryProvisioner<TEnvironment> {
  fn resolve(&self, coordinate: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    let mut pending = VecDeque::from([coordinate.to_string()]);
    seen.insert(coordinate.to_string());

    while let Some(text) = pending.pop_front() {
      let coordinate = Coordinate::parse(&text)?;
      let dir = self.artifact_dir(&coordinate);
      let base_name = format!("{}-{}", coordinate.artifact, coordinate.version);
      let file_path = dir.join(format!("{}.wasm", base_name));
      if !self.environment.path_exists(&file_path) {
        bail!("Could not find {} in {}.", text, self.root.display());
      }
      files.push(file_path);

      let deps_path = dir.join(format!("{}.deps", base_name));
      if self.environment.path_exists(&deps_path) {
        let deps_text = self
          .environment
          .read_file(&deps_path)
          .with_context(|| format!("Error reading dependencies of {}.", text))?;
        for line in deps_text.lines().map(|line| line.trim()) {
          if line.is_empty() || line.starts_with('#') {
            continue;
          }
          if seen.insert(line.to_string()) {
            pending.push_back(line.to_string());
          }
        }
      }
    }

    log_debug!(self.environment, "Resolved {} to {} file(s) in {}", coordinate, files.len(), self.root.display());
    Ok(files)
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;
  use stepfmt_core::environment::TestEnvironment;

  use super::*;

  #[test]
  fn resolves_transitive_dependencies_once() {
    let environment = TestEnvironment::new();
    environment.write_file("/repo/org/scalameta/scalafmt-core_2.13/3.0.8/scalafmt-core_2.13-3.0.8.wasm", "core");
    environment.write_file(
      "/repo/org/scalameta/scalafmt-core_2.13/3.0.8/scalafmt-core_2.13-3.0.8.deps",
      "# runtime\norg.scala-lang:scala-library:2.13.6\ncom.typesafe:config:1.4.1\n\n",
    );
    environment.write_file("/repo/org/scala-lang/scala-library/2.13.6/scala-library-2.13.6.wasm", "library");
    environment.write_file("/repo/com/typesafe/config/1.4.1/config-1.4.1.wasm", "config");
    environment.write_file("/repo/com/typesafe/config/1.4.1/config-1.4.1.deps", "org.scala-lang:scala-library:2.13.6\n");

    let provisioner = DirectoryProvisioner::new("/repo", environment);
    assert_eq!(
      provisioner.resolve("org.scalameta:scalafmt-core_2.13:3.0.8").unwrap(),
      vec![
        PathBuf::from("/repo/org/scalameta/scalafmt-core_2.13/3.0.8/scalafmt-core_2.13-3.0.8.wasm"),
        PathBuf::from("/repo/org/scala-lang/scala-library/2.13.6/scala-library-2.13.6.wasm"),
        PathBuf::from("/repo/com/typesafe/config/1.4.1/config-1.4.1.wasm"),
      ]
    );
  }

  #[test]
  fn missing_artifact() {
    let environment = TestEnvironment::new();
    let provisioner = DirectoryProvisioner::new("/repo", environment);
    let err = provisioner.resolve("com.geirsson:scalafmt-core_2.11:1.5.1").unwrap_err();
    assert_eq!(err.to_string(), "Could not find com.geirsson:scalafmt-core_2.11:1.5.1 in /repo.");
  }

  #[test]
  fn invalid_coordinate() {
    let environment = TestEnvironment::new();
    let provisioner = DirectoryProvisioner::new("/repo", environment);
    let err = provisioner.resolve("org.scalameta:scalafmt-core_2.13:").unwrap_err();
    assert_eq!(
      err.to_string(),
      "Expected a coordinate in the form 'group:artifact:version', but got 'org.scalameta:scalafmt-core_2.13:'."
    );
  }
}
