use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use stepfmt_core::environment::Environment;
use stepfmt_core::license_header::LicenseHeaderStep;
use stepfmt_core::license_header::DEFAULT_YEAR_DELIMITER;
use stepfmt_core::license_header::NAME;
use stepfmt_core::FormatterFunc;
use stepfmt_core::FormatterStep;
use stepfmt_core::StepError;

use crate::Encoding;
use crate::FileLocator;
use crate::FormatterStepConfig;
use crate::FormatterStepFactory;

/// The `licenseHeader` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LicenseHeader {
  /// Path to a file holding the header, relative to the project.
  pub file: Option<String>,
  /// The header text.
  pub content: Option<String>,
  pub delimiter: Option<String>,
}

#[derive(Debug, Clone)]
enum HeaderSource {
  Inline(String),
  File(String),
}

impl HeaderSource {
  fn read(&self, file_locator: &FileLocator, encoding: Encoding, environment: &impl Environment) -> Result<String> {
    match self {
      HeaderSource::Inline(content) => Ok(content.clone()),
      HeaderSource::File(file) => {
        let file_path = file_locator.locate_file(file, environment)?;
        encoding.read_file(&file_path, environment)
      }
    }
  }
}

impl FormatterStepFactory for LicenseHeader {
  fn new_formatter_step<TEnvironment: Environment>(&self, config: &FormatterStepConfig<TEnvironment>) -> Result<FormatterStep> {
    let delimiter = match self.delimiter.as_deref().or(config.license_header_delimiter()) {
      Some(delimiter) => delimiter.to_string(),
      None => return Err(StepError::Config("You need to specify 'delimiter'.".to_string()).into()),
    };
    let source = match (&self.file, &self.content) {
      (Some(file), None) => HeaderSource::File(file.clone()),
      (None, Some(content)) => HeaderSource::Inline(content.clone()),
      _ => return Err(StepError::Config("Must specify exactly one of 'file' or 'content'.".to_string()).into()),
    };
    let file_locator = config.file_locator().clone();
    let encoding = config.encoding();
    let environment = config.environment().clone();

    let step = if config.set_license_header_years_from_git_history() == Some("true") {
      FormatterStep::create_never_up_to_date_lazy(NAME, move || {
        let header = source.read(&file_locator, encoding, &environment)?;
        // years come from git history so update mode is irrelevant
        let step = LicenseHeaderStep::new(&header, &delimiter, DEFAULT_YEAR_DELIMITER, false, environment.current_year())?;
        Ok(Box::new(GitHistoryLicenseHeaderFunc {
          step,
          environment: environment.clone(),
        }) as Box<dyn FormatterFunc>)
      })
    } else {
      // years are only updated when formatting files changed since `ratchet_from`
      let update_year = config.ratchet_from().is_some();
      FormatterStep::create_lazy(
        NAME,
        move || {
          let header = source.read(&file_locator, encoding, &environment)?;
          LicenseHeaderStep::new(&header, &delimiter, DEFAULT_YEAR_DELIMITER, update_year, environment.current_year())
        },
        |step| {
          let step = step.clone();
          Ok(Box::new(move |input: &str| step.format(input)) as Box<dyn FormatterFunc>)
        },
      )
    };
    Ok(step.filter_by_file(LicenseHeaderStep::unsupported_jvm_files_filter()))
  }
}

struct GitHistoryLicenseHeaderFunc<TEnvironment: Environment> {
  step: LicenseHeaderStep,
  environment: TEnvironment,
}

impl<TEnvironment: Environment> FormatterFunc for GitHistoryLicenseHeaderFunc<TEnvironment> {
  fn apply(&self, _input: &str) -> Result<String> {
    Err(StepError::UnsupportedOperation("Setting license header years from git history requires the file being formatted.".to_string()).into())
  }

  fn apply_with_file(&self, input: &str, file_path: &Path) -> Result<String> {
    self.step.set_license_header_years_from_git_history(input, file_path, &self.environment)
  }
}
