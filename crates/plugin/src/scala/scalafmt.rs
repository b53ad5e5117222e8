use anyhow::Result;
use serde::Deserialize;
use stepfmt_core::environment::Environment;
use stepfmt_core::FormatterStep;

use crate::FormatterStepConfig;
use crate::FormatterStepFactory;

/// The `scalafmt` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scalafmt {
  /// Defaults to `stepfmt_scalafmt::DEFAULT_VERSION`.
  pub version: Option<String>,
  /// Path to the `.scalafmt.conf` file, relative to the project.
  pub file: Option<String>,
}

impl FormatterStepFactory for Scalafmt {
  fn new_formatter_step<TEnvironment: Environment>(&self, config: &FormatterStepConfig<TEnvironment>) -> Result<FormatterStep> {
    let config_file = match &self.file {
      Some(file) => Some(config.file_locator().locate_file(file, config.environment())?),
      None => None,
    };
    Ok(stepfmt_scalafmt::create(
      self.version.as_deref(),
      config.provisioner().clone(),
      config_file,
      config.environment().clone(),
    ))
  }
}
