use std::sync::Arc;

use stepfmt_core::environment::Environment;
use stepfmt_core::Provisioner;

use crate::Encoding;
use crate::FileLocator;

/// Settings shared by every step of a format.
#[derive(Debug, Clone, Default)]
pub struct FormatterStepOptions {
  pub encoding: Encoding,
  pub license_header_delimiter: Option<String>,
  /// The git reference changes are ratcheted from, if any.
  pub ratchet_from: Option<String>,
  pub set_license_header_years_from_git_history: Option<String>,
}

/// What a step factory gets to build its step with.
#[derive(Clone)]
pub struct FormatterStepConfig<TEnvironment: Environment> {
  options: FormatterStepOptions,
  file_locator: FileLocator,
  provisioner: Arc<dyn Provisioner>,
  environment: TEnvironment,
}

impl<TEnvironment: Environment> FormatterStepConfig<TEnvironment> {
  pub fn new(options: FormatterStepOptions, file_locator: FileLocator, provisioner: Arc<dyn Provisioner>, environment: TEnvironment) -> Self {
    FormatterStepConfig {
      options,
      file_locator,
      provisioner,
      environment,
    }
  }

  pub fn encoding(&self) -> Encoding {
    self.options.encoding
  }

  pub fn license_header_delimiter(&self) -> Option<&str> {
    self.options.license_header_delimiter.as_deref()
  }

  pub fn ratchet_from(&self) -> Option<&str> {
    self.options.ratchet_from.as_deref()
  }

  pub fn set_license_header_years_from_git_history(&self) -> Option<&str> {
    self.options.set_license_header_years_from_git_history.as_deref()
  }

  pub fn file_locator(&self) -> &FileLocator {
    &self.file_locator
  }

  pub fn provisioner(&self) -> &Arc<dyn Provisioner> {
    &self.provisioner
  }

  pub fn environment(&self) -> &TEnvironment {
    &self.environment
  }
}
