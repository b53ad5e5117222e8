use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use stepfmt_core::environment::Environment;
use stepfmt_core::log_debug;
use stepfmt_core::ArtifactState;
use stepfmt_core::FileSignature;
use stepfmt_core::FormatterFunc;
use stepfmt_core::FormatterStep;
use stepfmt_core::Provisioner;
use stepfmt_core::StepError;

use crate::api::bind;
use crate::api::ApiEra;
use crate::api::ScalafmtApi;
use crate::api::StyleHandle;
use crate::version::maven_coordinate;
use crate::version::DEFAULT_VERSION;
use crate::wasm::IsolatedClasspath;

pub const NAME: &str = "scalafmt";

/// Everything that determines how the step formats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct State {
  artifacts: ArtifactState,
  config_signature: FileSignature,
}

/// Creates a step using the default scalafmt version and style.
pub fn create_default<TEnvironment: Environment>(provisioner: Arc<dyn Provisioner>, environment: TEnvironment) -> FormatterStep {
  create(None, provisioner, None, environment)
}

/// Creates a scalafmt step.
///
/// Nothing is resolved or loaded until the step is first used.
pub fn create<TEnvironment: Environment>(
  version: Option<&str>,
  provisioner: Arc<dyn Provisioner>,
  config_file: Option<PathBuf>,
  environment: TEnvironment,
) -> FormatterStep {
  let version = version.unwrap_or(DEFAULT_VERSION).to_string();
  let state_environment = environment.clone();
  FormatterStep::create_lazy(
    NAME,
    move || {
      let coordinate = maven_coordinate(&version);
      log_debug!(state_environment, "Using {} for scalafmt {}", coordinate, version);
      let artifacts = ArtifactState::from(&coordinate, provisioner.as_ref(), &state_environment)?;
      let config_signature = match &config_file {
        Some(config_file) => FileSignature::sign_as_list([config_file.clone()], &state_environment)
          .with_context(|| StepError::Config(format!("Could not read the scalafmt config file {}.", config_file.display())))?,
        None => FileSignature::empty(),
      };
      Ok(State {
        artifacts,
        config_signature,
      })
    },
    move |state| Ok(Box::new(ScalafmtFunc::realize(state, &environment)?) as Box<dyn FormatterFunc>),
  )
}

struct LinkedFormatter {
  api: Box<dyn ScalafmtApi>,
  style: StyleHandle,
}

/// The realized formatting function.
///
/// Instances are not shareable between threads, so each call borrows one
/// from the pool and links another when the pool is empty.
struct ScalafmtFunc {
  classpath: IsolatedClasspath,
  config: Option<String>,
  instances: Mutex<Vec<LinkedFormatter>>,
}

impl ScalafmtFunc {
  fn realize(state: &State, environment: &impl Environment) -> Result<Self> {
    let start = Instant::now();
    let classpath = IsolatedClasspath::load(&state.artifacts, environment)?;
    let config = if state.config_signature.is_empty() {
      None
    } else {
      Some(environment.read_file(state.config_signature.only_file()?)?)
    };
    let func = ScalafmtFunc {
      classpath,
      config,
      instances: Default::default(),
    };

    // link one instance now so linkage and config errors surface here
    let formatter = func.link_formatter()?;
    log_debug!(
      environment,
      "Realized {} with the {} API in {}ms",
      state.artifacts.coordinate(),
      match formatter.api.era() {
        ApiEra::Legacy => "legacy",
        ApiEra::Modern => "modern",
      },
      start.elapsed().as_millis()
    );
    func.instances.lock().push(formatter);
    Ok(func)
  }

  fn link_formatter(&self) -> Result<LinkedFormatter> {
    let mut api = bind(&self.classpath)?;
    let style = match &self.config {
      Some(config) => api.parse_config(config)?,
      None => api.default_style()?,
    };
    Ok(LinkedFormatter { api, style })
  }
}

impl FormatterFunc for ScalafmtFunc {
  fn apply(&self, input: &str) -> Result<String> {
    let pooled = self.instances.lock().pop();
    let mut formatter = match pooled {
      Some(formatter) => formatter,
      None => self.link_formatter()?,
    };
    let result = formatter.api.format(input, formatter.style);
    // an instance that failed may be left in a bad state
    if result.is_ok() {
      self.instances.lock().push(formatter);
    }
    result
  }
}

#[cfg(test)]
mod test {
  use std::path::Path;

  use pretty_assertions::assert_eq;
  use stepfmt_core::environment::TestEnvironment;

  use super::*;
  use crate::testing::*;

  fn setup(fixture: FormatterFixture) -> (TestEnvironment, FixedProvisioner) {
    let environment = TestEnvironment::new();
    let files = write_modules(&environment, "/m2", &[("scalafmt-core.wasm", fixture.to_wasm())]);
    (environment, FixedProvisioner::new(files))
  }

  fn scala_path() -> &'static Path {
    Path::new("/project/src/main/scala/A.scala")
  }

  #[test]
  fn formats_with_default_style() {
    let (environment, provisioner) = setup(FormatterFixture::modern());
    let step = create_default(Arc::new(provisioner.clone()), environment);
    assert_eq!(step.name(), "scalafmt");
    assert_eq!(step.format("object A", scala_path()).unwrap(), Some("object A\n".to_string()));
    assert_eq!(provisioner.requests(), vec!["org.scalameta:scalafmt-core_2.13:3.0.8".to_string()]);
  }

  #[test]
  fn resolves_coordinate_for_version() {
    let (environment, provisioner) = setup(FormatterFixture::legacy());
    let step = create(Some("1.5.1"), Arc::new(provisioner.clone()), None, environment);
    step.func().unwrap();
    assert_eq!(provisioner.requests(), vec!["com.geirsson:scalafmt-core_2.11:1.5.1".to_string()]);
  }

  #[test]
  fn applies_config_file() {
    for fixture in [FormatterFixture::modern(), FormatterFixture::legacy()] {
      let (environment, provisioner) = setup(fixture);
      environment.write_file("/project/.scalafmt.conf", "maxColumn = 40\n");
      let step = create(
        Some("3.0.8"),
        Arc::new(provisioner),
        Some(PathBuf::from("/project/.scalafmt.conf")),
        environment,
      );
      assert_eq!(step.format("object A", scala_path()).unwrap(), Some("object A".to_string()));
    }
  }

  #[test]
  fn config_diagnostic_surfaces_at_realization() {
    let (environment, provisioner) = setup(FormatterFixture::modern());
    environment.write_file("/project/.scalafmt.conf", "! maxColumn 40\n");
    let step = create(None, Arc::new(provisioner), Some(PathBuf::from("/project/.scalafmt.conf")), environment);
    let err = step.func().err().unwrap();
    assert_eq!(StepError::find(&err), Some(&StepError::ConfigParse(CONFIG_DIAGNOSTIC.to_string())));
  }

  #[test]
  fn missing_config_file() {
    let (environment, provisioner) = setup(FormatterFixture::modern());
    let step = create(None, Arc::new(provisioner), Some(PathBuf::from("/project/.scalafmt.conf")), environment);
    let err = step.cache_key().unwrap_err();
    assert!(matches!(StepError::find(&err), Some(StepError::Config(_))));
  }

  #[test]
  fn resolution_failure() {
    let environment = TestEnvironment::new();
    let provisioner = |coordinate: &str| -> Result<Vec<PathBuf>> { anyhow::bail!("Could not find artifact {} in any repository", coordinate) };
    let step = create(Some("2.7.5"), Arc::new(provisioner), None, environment);
    let err = step.format("object A", scala_path()).unwrap_err();
    assert_eq!(
      StepError::find(&err),
      Some(&StepError::Resolution("org.scalameta:scalafmt-core_2.11:2.7.5".to_string()))
    );
  }

  #[test]
  fn unsupported_version_is_linkage_error() {
    let (environment, provisioner) = setup(FormatterFixture::legacy().without_export("Configured.get"));
    let step = create(Some("0.7.0"), Arc::new(provisioner), None, environment);
    let err = step.func().err().unwrap();
    assert!(matches!(StepError::find(&err), Some(StepError::Linkage(_))));
    assert!(err.to_string().ends_with("This formatter version is probably not supported."));
  }

  #[test]
  fn format_error_discards_instance() {
    let (environment, provisioner) = setup(FormatterFixture::modern());
    let step = create_default(Arc::new(provisioner), environment);
    let err = step.format("# not scala", scala_path()).unwrap_err();
    assert_eq!(StepError::find(&err), Some(&StepError::Format(FORMAT_ERROR.to_string())));
    // a fresh instance is linked for the next call
    assert_eq!(step.format("object B\n", scala_path()).unwrap(), Some("object B\n".to_string()));
  }

  #[test]
  fn links_dependencies_before_the_formatter() {
    let environment = TestEnvironment::new();
    // resolution order lists the formatter first
    let files = write_modules(
      &environment,
      "/m2",
      &[
        ("scalafmt-core.wasm", FormatterFixture::modern().importing_newline_from("scala-library").to_wasm()),
        ("scala-library.wasm", newline_module_wasm(None)),
      ],
    );
    let step = create_default(Arc::new(FixedProvisioner::new(files)), environment);
    assert_eq!(step.format("object A", scala_path()).unwrap(), Some("object A\n".to_string()));
  }

  #[test]
  fn links_dependencies_by_module_name() {
    let environment = TestEnvironment::new();
    let files = write_modules(
      &environment,
      "/m2",
      &[
        ("scala-library-2.13.6.wasm", newline_module_wasm(Some("scala-library"))),
        ("scalafmt-core_2.13-3.0.8.wasm", FormatterFixture::modern().importing_newline_from("scala-library").to_wasm()),
      ],
    );
    let step = create_default(Arc::new(FixedProvisioner::new(files)), environment);
    assert_eq!(step.format("object A", scala_path()).unwrap(), Some("object A\n".to_string()));
  }

  #[test]
  fn unresolved_import_is_linkage_error() {
    let environment = TestEnvironment::new();
    let files = write_modules(
      &environment,
      "/m2",
      &[("scalafmt-core.wasm", FormatterFixture::modern().importing_newline_from("scala-library").to_wasm())],
    );
    let step = create_default(Arc::new(FixedProvisioner::new(files)), environment);
    let err = step.func().err().unwrap();
    assert!(matches!(StepError::find(&err), Some(StepError::Linkage(_))));
  }

  #[test]
  fn signatures() {
    let environment = TestEnvironment::new();
    let core = write_modules(&environment, "/a", &[("scalafmt-core.wasm", FormatterFixture::modern().to_wasm())]);
    let moved_core = write_modules(&environment, "/b", &[("scalafmt-core.wasm", FormatterFixture::modern().to_wasm())]);
    environment.write_file("/a/.scalafmt.conf", "maxColumn = 40\n");
    environment.write_file("/b/.scalafmt.conf", "maxColumn = 40\n");
    environment.write_file("/c/.scalafmt.conf", "maxColumn = 80\n");

    let step = |files: &Vec<PathBuf>, config: Option<&str>| {
      create(
        Some("3.0.8"),
        Arc::new(FixedProvisioner::new(files.clone())),
        config.map(PathBuf::from),
        environment.clone(),
      )
    };
    let a = step(&core, Some("/a/.scalafmt.conf"));
    let b = step(&moved_core, Some("/b/.scalafmt.conf"));
    let c = step(&core, Some("/c/.scalafmt.conf"));
    let d = step(&core, None);
    assert_eq!(a.cache_key().unwrap(), b.cache_key().unwrap());
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_ne!(c, d);
  }

  #[test]
  fn signatures_follow_version() {
    let environment = TestEnvironment::new();
    let files = write_modules(&environment, "/m2", &[("scalafmt-core.wasm", FormatterFixture::modern().to_wasm())]);
    let step = |version: &str| create(Some(version), Arc::new(FixedProvisioner::new(files.clone())), None, environment.clone());
    assert_eq!(step("3.0.8").cache_key().unwrap(), step("3.0.8").cache_key().unwrap());
    assert_ne!(step("3.0.7").cache_key().unwrap(), step("3.0.8").cache_key().unwrap());
    assert_ne!(step("2.7.5"), step("3.0.8"));
  }

  #[test]
  fn logs_realization_when_debugging() {
    let (environment, provisioner) = setup(FormatterFixture::modern());
    environment.set_debug(true);
    let step = create_default(Arc::new(provisioner), environment.clone());
    step.func().unwrap();

    let messages = environment.take_stderr_messages();
    assert_eq!(messages[0], "[DEBUG] Using org.scalameta:scalafmt-core_2.13:3.0.8 for scalafmt 3.0.8");
    assert_eq!(messages[1], "[DEBUG] Resolved 1 artifact(s) for org.scalameta:scalafmt-core_2.13:3.0.8");
    let realized = messages.last().unwrap();
    assert!(
      realized.starts_with("[DEBUG] Realized org.scalameta:scalafmt-core_2.13:3.0.8 with the modern API in "),
      "{}",
      realized
    );
  }

  #[test]
  fn concurrent_formatting() {
    let (environment, provisioner) = setup(FormatterFixture::modern());
    let step = create_default(Arc::new(provisioner), environment);
    std::thread::scope(|scope| {
      for i in 0..8 {
        let step = &step;
        scope.spawn(move || {
          for j in 0..10 {
            let input = format!("object A{}{}", i, j);
            let expected = format!("{}\n", input);
            assert_eq!(step.format(&input, scala_path()).unwrap(), Some(expected));
          }
        });
      }
    });
  }
}
