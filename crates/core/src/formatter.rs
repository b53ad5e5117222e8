use std::path::Path;

use anyhow::Context;
use anyhow::Result;

use crate::FormatterStep;

/// Runs a sequence of steps over a file's text.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
  steps: Vec<FormatterStep>,
}

impl Formatter {
  pub fn new(steps: Vec<FormatterStep>) -> Self {
    Formatter { steps }
  }

  pub fn steps(&self) -> &[FormatterStep] {
    &self.steps
  }

  /// Applies every step that accepts the file, feeding each output to the next step.
  pub fn compute(&self, text: &str, file_path: &Path) -> Result<String> {
    let mut text = text.replace("\r\n", "\n");
    for step in &self.steps {
      if let Some(formatted) = step
        .format(&text, file_path)
        .with_context(|| format!("Error running step '{}' on {}", step.name(), file_path.display()))?
      {
        text = formatted;
      }
    }
    Ok(text)
  }

  /// Gets if the steps leave the text unchanged.
  pub fn is_clean(&self, text: &str, file_path: &Path) -> Result<bool> {
    Ok(self.compute(text, file_path)? == text)
  }
}
