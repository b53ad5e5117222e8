use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use stepfmt_core::environment::RealEnvironment;
use stepfmt_core::environment::RealEnvironmentOptions;
use stepfmt_core::environment::TestEnvironment;
use stepfmt_core::StepError;
use stepfmt_plugin::DirectoryProvisioner;
use stepfmt_plugin::PluginConfig;
use stepfmt_scalafmt::testing::newline_module_wasm;
use stepfmt_scalafmt::testing::FormatterFixture;
use stepfmt_scalafmt::testing::CONFIG_DIAGNOSTIC;

const SOURCE: &str = "object A{val x=1}";

/// Publishes a formatter release into a repository laid out like maven's.
fn publish(environment: &TestEnvironment, coordinate_dir: &str, base_name: &str, wasm: Vec<u8>, deps: &[&str]) {
  let dir = Path::new("/repo").join(coordinate_dir);
  environment.write_file_bytes(dir.join(format!("{}.wasm", base_name)), &wasm);
  if !deps.is_empty() {
    environment.write_file(dir.join(format!("{}.deps", base_name)), &deps.join("\n"));
  }
}

fn formatter(json: &str, environment: &TestEnvironment) -> stepfmt_core::Formatter {
  let provisioner = Arc::new(DirectoryProvisioner::new("/repo", environment.clone()));
  PluginConfig::from_json(json)
    .unwrap()
    .create_formatter("/project", provisioner, environment.clone())
    .unwrap()
}

#[test]
fn pre_2_0_versions_use_the_geirsson_coordinates() {
  let environment = TestEnvironment::new();
  publish(
    &environment,
    "com/geirsson/scalafmt-core_2.11/1.5.1",
    "scalafmt-core_2.11-1.5.1",
    FormatterFixture::legacy().to_wasm(),
    &[],
  );
  let formatter = formatter(r#"{ "scalafmt": { "version": "1.5.1" } }"#, &environment);
  let path = Path::new("/project/src/main/scala/A.scala");
  let formatted = formatter.compute(SOURCE, path).unwrap();
  assert_eq!(formatted, "object A{val x=1}\n");
  assert!(formatter.is_clean(&formatted, path).unwrap());
}

#[test]
fn pre_3_0_versions_use_the_scala_2_11_coordinates() {
  let environment = TestEnvironment::new();
  publish(
    &environment,
    "org/scalameta/scalafmt-core_2.11/2.0.0",
    "scalafmt-core_2.11-2.0.0",
    FormatterFixture::modern().to_wasm(),
    &[],
  );
  let formatter = formatter(r#"{ "scalafmt": { "version": "2.0.0" } }"#, &environment);
  assert_eq!(formatter.compute(SOURCE, Path::new("A.scala")).unwrap(), "object A{val x=1}\n");

  let missing = formatter_err(r#"{ "scalafmt": { "version": "2.1.0" } }"#, &environment);
  assert_eq!(
    StepError::find(&missing),
    Some(&StepError::Resolution("org.scalameta:scalafmt-core_2.11:2.1.0".to_string()))
  );
}

fn formatter_err(json: &str, environment: &TestEnvironment) -> anyhow::Error {
  formatter(json, environment).compute(SOURCE, Path::new("A.scala")).unwrap_err()
}

#[test]
fn config_file_is_applied() {
  let environment = TestEnvironment::new();
  publish(
    &environment,
    "org/scalameta/scalafmt-core_2.13/3.0.8",
    "scalafmt-core_2.13-3.0.8",
    FormatterFixture::modern().importing_newline_from("scala-library-2.13.6").to_wasm(),
    &["org.scala-lang:scala-library:2.13.6"],
  );
  publish(
    &environment,
    "org/scala-lang/scala-library/2.13.6",
    "scala-library-2.13.6",
    newline_module_wasm(None),
    &[],
  );
  environment.write_file("/project/.scalafmt.conf", "maxColumn = 40\n");

  let with_config = formatter(r#"{ "scalafmt": { "version": "3.0.8", "file": ".scalafmt.conf" } }"#, &environment);
  assert_eq!(with_config.compute(SOURCE, Path::new("A.scala")).unwrap(), SOURCE);
  let with_defaults = formatter(r#"{ "scalafmt": {} }"#, &environment);
  assert_eq!(with_defaults.compute(SOURCE, Path::new("A.scala")).unwrap(), "object A{val x=1}\n");
  assert_ne!(with_config.steps()[0], with_defaults.steps()[0]);
}

#[test]
fn config_diagnostic_is_reported() {
  let environment = TestEnvironment::new();
  publish(
    &environment,
    "org/scalameta/scalafmt-core_2.13/3.0.8",
    "scalafmt-core_2.13-3.0.8",
    FormatterFixture::modern().to_wasm(),
    &[],
  );
  environment.write_file("/project/.scalafmt.conf", "!maxColumn\n");
  let err = formatter_err(r#"{ "scalafmt": { "file": ".scalafmt.conf" } }"#, &environment);
  assert_eq!(StepError::find(&err), Some(&StepError::ConfigParse(CONFIG_DIAGNOSTIC.to_string())));
}

#[test]
fn missing_config_file_is_rejected_up_front() {
  let environment = TestEnvironment::new();
  let provisioner = Arc::new(DirectoryProvisioner::new("/repo", environment.clone()));
  let err = PluginConfig::from_json(r#"{ "scalafmt": { "file": ".scalafmt.conf" } }"#)
    .unwrap()
    .create_steps("/project", provisioner, environment)
    .unwrap_err();
  assert!(matches!(StepError::find(&err), Some(StepError::Config(_))));
}

#[test]
fn formats_then_adds_license_header() {
  let environment = TestEnvironment::new();
  publish(
    &environment,
    "org/scalameta/scalafmt-core_2.13/3.0.8",
    "scalafmt-core_2.13-3.0.8",
    FormatterFixture::modern().to_wasm(),
    &[],
  );
  let formatter = formatter(
    r#"{
      "licenseHeaderDelimiter": "object ",
      "licenseHeader": { "content": "/* MIT */" },
      "scalafmt": {}
    }"#,
    &environment,
  );
  assert_eq!(formatter.steps().iter().map(|step| step.name()).collect::<Vec<_>>(), vec!["scalafmt", "licenseHeader"]);
  assert_eq!(formatter.compute(SOURCE, Path::new("A.scala")).unwrap(), "/* MIT */\nobject A{val x=1}\n");
}

#[test]
fn resolves_from_a_repository_on_disk() {
  let temp_dir = tempfile::tempdir().unwrap();
  let repo = temp_dir.path().join("repo");
  let release_dir = repo.join("org/scalameta/scalafmt-core_2.13/3.0.8");
  std::fs::create_dir_all(&release_dir).unwrap();
  std::fs::write(release_dir.join("scalafmt-core_2.13-3.0.8.wasm"), FormatterFixture::modern().to_wasm()).unwrap();
  let project = temp_dir.path().join("project");
  std::fs::create_dir_all(&project).unwrap();
  std::fs::write(project.join(".scalafmt.conf"), "maxColumn = 40\n").unwrap();

  let environment = RealEnvironment::new(&RealEnvironmentOptions::default());
  let provisioner = Arc::new(DirectoryProvisioner::new(repo, environment.clone()));
  let formatter = PluginConfig::from_json(r#"{ "scalafmt": { "file": ".scalafmt.conf" } }"#)
    .unwrap()
    .create_formatter(&project, provisioner, environment)
    .unwrap();
  assert_eq!(formatter.compute(SOURCE, &project.join("A.scala")).unwrap(), SOURCE);
}
