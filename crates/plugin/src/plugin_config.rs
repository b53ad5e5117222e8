use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use stepfmt_core::environment::Environment;
use stepfmt_core::log_debug;
use stepfmt_core::Formatter;
use stepfmt_core::FormatterStep;
use stepfmt_core::Provisioner;
use stepfmt_core::StepError;

use crate::generic::LicenseHeader;
use crate::scala::Scalafmt;
use crate::Encoding;
use crate::FileLocator;
use crate::FormatterStepConfig;
use crate::FormatterStepFactory;
use crate::FormatterStepOptions;

/// The build tool's stepfmt configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginConfig {
  #[serde(default)]
  pub encoding: Encoding,
  pub ratchet_from: Option<String>,
  pub license_header_delimiter: Option<String>,
  pub set_license_header_years_from_git_history: Option<String>,
  pub license_header: Option<LicenseHeader>,
  pub scalafmt: Option<Scalafmt>,
}

impl PluginConfig {
  pub fn from_json(text: &str) -> Result<Self> {
    match serde_json::from_str(text) {
      Ok(config) => Ok(config),
      Err(err) => Err(StepError::Config(format!("Error parsing configuration: {}", err)).into()),
    }
  }

  pub fn step_config<TEnvironment: Environment>(
    &self,
    base_dir: impl Into<PathBuf>,
    provisioner: Arc<dyn Provisioner>,
    environment: TEnvironment,
  ) -> FormatterStepConfig<TEnvironment> {
    let options = FormatterStepOptions {
      encoding: self.encoding,
      license_header_delimiter: self.license_header_delimiter.clone(),
      ratchet_from: self.ratchet_from.clone(),
      set_license_header_years_from_git_history: self.set_license_header_years_from_git_history.clone(),
    };
    FormatterStepConfig::new(options, FileLocator::new(base_dir), provisioner, environment)
  }

  /// Creates the configured steps, formatting before adding the license header.
  pub fn create_steps<TEnvironment: Environment>(
    &self,
    base_dir: impl Into<PathBuf>,
    provisioner: Arc<dyn Provisioner>,
    environment: TEnvironment,
  ) -> Result<Vec<FormatterStep>> {
    let config = self.step_config(base_dir, provisioner, environment);
    let mut steps = Vec::new();
    if let Some(scalafmt) = &self.scalafmt {
      steps.push(scalafmt.new_formatter_step(&config)?);
    }
    if let Some(license_header) = &self.license_header {
      steps.push(license_header.new_formatter_step(&config)?);
    }
    log_debug!(
      config.environment(),
      "Created steps: {}",
      steps.iter().map(|step| step.name()).collect::<Vec<_>>().join(", ")
    );
    Ok(steps)
  }

  pub fn create_formatter<TEnvironment: Environment>(
    &self,
    base_dir: impl Into<PathBuf>,
    provisioner: Arc<dyn Provisioner>,
    environment: TEnvironment,
  ) -> Result<Formatter> {
    Ok(Formatter::new(self.create_steps(base_dir, provisioner, environment)?))
  }
}
