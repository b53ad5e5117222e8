use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use regex::Regex;
use regex::RegexBuilder;
use serde::Serialize;

use super::file_commit_years;
use super::CommitYears;
use crate::environment::Environment;
use crate::ExcludeFileNames;
use crate::FileFilter;
use crate::StepError;

pub const NAME: &str = "licenseHeader";
pub const DEFAULT_YEAR_DELIMITER: &str = "-";
const YEAR_TOKEN: &str = "$YEAR";

/// The header text around the `$YEAR` token.
#[derive(Debug, Clone)]
struct YearToken {
  before_year: String,
  after_year: String,
  /// Matches `2019` or `2019-2024` with the configured separator.
  year_matcher: Regex,
}

/// Normalizes the license header at the top of a file.
///
/// Everything before the first line matching the delimiter is the header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseHeaderStep {
  license_header: String,
  delimiter: String,
  year_separator: String,
  update_year_with_latest: bool,
  /// Only set when the header contains `$YEAR`.
  year_today: Option<i32>,
  #[serde(skip)]
  delimiter_pattern: Regex,
  #[serde(skip)]
  year_token: Option<YearToken>,
}

impl LicenseHeaderStep {
  pub fn new(license_header: &str, delimiter: &str, year_separator: &str, update_year_with_latest: bool, current_year: i32) -> Result<Self> {
    let mut license_header = license_header.replace("\r\n", "\n");
    if license_header.trim().is_empty() {
      return Err(StepError::Config("The license header must not be empty.".to_string()).into());
    }
    if !license_header.ends_with('\n') {
      license_header.push('\n');
    }

    let delimiter_pattern = RegexBuilder::new(&format!("^{}", delimiter))
      .multi_line(true)
      .build()
      .map_err(|err| StepError::Config(format!("Invalid delimiter '{}': {}", delimiter, err)))?;

    let year_token = match license_header.find(YEAR_TOKEN) {
      Some(index) => Some(YearToken {
        before_year: license_header[..index].to_string(),
        after_year: license_header[index + YEAR_TOKEN.len()..].to_string(),
        year_matcher: Regex::new(&format!(r"^[0-9]{{4}}({}[0-9]{{4}})?$", regex::escape(year_separator)))?,
      }),
      None => None,
    };

    Ok(LicenseHeaderStep {
      year_today: year_token.as_ref().map(|_| current_year),
      license_header,
      delimiter: delimiter.to_string(),
      year_separator: year_separator.to_string(),
      update_year_with_latest,
      delimiter_pattern,
      year_token,
    })
  }

  /// Rejects the files a license header makes no sense for.
  pub fn unsupported_jvm_files_filter() -> Arc<dyn FileFilter> {
    Arc::new(ExcludeFileNames::new(["package-info.java", "module-info.java"]))
  }

  pub fn license_header(&self) -> &str {
    &self.license_header
  }

  pub fn format(&self, raw: &str) -> Result<String> {
    let content_start = self.content_start(raw)?;
    let content = &raw[content_start..];
    match (&self.year_token, self.year_today) {
      (Some(token), Some(year_today)) => {
        let existing = &raw[..content_start];
        let header = self
          .calculate_year_exact(existing, token, year_today)
          .unwrap_or_else(|| format!("{}{}{}", token.before_year, year_today, token.after_year));
        Ok(header + content)
      }
      _ => {
        if content_start == self.license_header.len() && raw.starts_with(&self.license_header) {
          Ok(raw.to_string())
        } else {
          Ok(format!("{}{}", self.license_header, content))
        }
      }
    }
  }

  /// Sets the header years from the git history of the file.
  pub fn set_license_header_years_from_git_history(&self, raw: &str, file_path: &Path, environment: &impl Environment) -> Result<String> {
    let (Some(token), Some(year_today)) = (&self.year_token, self.year_today) else {
      return Ok(raw.to_string());
    };
    let content_start = self.content_start(raw)?;
    let years = file_commit_years(environment, file_path)?.unwrap_or(CommitYears {
      oldest: year_today,
      newest: year_today,
    });
    let year_range = if years.oldest == years.newest {
      years.oldest.to_string()
    } else {
      format!("{}{}{}", years.oldest, self.year_separator, years.newest)
    };
    Ok(format!("{}{}{}{}", token.before_year, year_range, token.after_year, &raw[content_start..]))
  }

  fn content_start(&self, raw: &str) -> Result<usize> {
    match self.delimiter_pattern.find(raw) {
      Some(found) => Ok(found.start()),
      None => Err(StepError::Format(format!("Unable to find delimiter regex {}", self.delimiter_pattern.as_str())).into()),
    }
  }

  /// Keeps or updates the existing header when it only differs by its years.
  fn calculate_year_exact(&self, existing: &str, token: &YearToken, year_today: i32) -> Option<String> {
    let years = existing.strip_prefix(&token.before_year)?.strip_suffix(&token.after_year)?;
    if years == year_today.to_string() {
      return Some(existing.to_string());
    }
    if !token.year_matcher.is_match(years) {
      return None;
    }
    if !self.update_year_with_latest {
      return Some(existing.to_string());
    }
    let first_year = &years[..4];
    Some(if first_year == year_today.to_string() {
      format!("{}{}{}", token.before_year, year_today, token.after_year)
    } else {
      format!("{}{}{}{}{}", token.before_year, first_year, self.year_separator, year_today, token.after_year)
    })
  }
}
