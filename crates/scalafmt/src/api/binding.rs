use anyhow::Context;
use anyhow::Result;
use stepfmt_core::StepError;
use wasmer::TypedFunction;

use super::StyleHandle;
use crate::wasm::LinkedInstance;

/// Context for failures while the formatter parses its config.
pub const CONFIG_FAILED: &str = "The formatter failed parsing its config.";

/// The symbols every supported scalafmt release exports.
pub struct ScalafmtBinding {
  instance: LinkedInstance,
  format: TypedFunction<(i32, i32), i32>,
  format_default_style: TypedFunction<(), i32>,
  format_default_range: TypedFunction<(), i32>,
  formatted_get: TypedFunction<i32, i32>,
  configured_get: TypedFunction<i32, i32>,
}

impl ScalafmtBinding {
  pub fn bind(instance: LinkedInstance) -> Result<Self> {
    Ok(ScalafmtBinding {
      format: instance.export("Scalafmt.format")?,
      format_default_style: instance.export("Scalafmt.format$default$2")?,
      format_default_range: instance.export("Scalafmt.format$default$3")?,
      formatted_get: instance.export("Formatted.get")?,
      configured_get: instance.export("Configured.get")?,
      instance,
    })
  }

  pub fn instance_mut(&mut self) -> &mut LinkedInstance {
    &mut self.instance
  }

  pub fn default_style(&mut self) -> Result<StyleHandle> {
    self
      .format_default_style
      .call(self.instance.store_mut())
      .context(StepError::Format("The formatter failed providing its default style.".to_string()))
  }

  /// Formats the source, unwrapping the `Formatted` result.
  ///
  /// Any failure inside the formatter module is a format error.
  pub fn format(&mut self, source: &str, style: StyleHandle) -> Result<String> {
    let len = self
      .call_format(source, style)
      .context(StepError::Format("The formatter failed.".to_string()))?;
    let text = self
      .instance
      .receive_string(len.unsigned_abs() as usize)
      .context(StepError::Format("Could not read the formatter's result.".to_string()))?;
    if len >= 0 {
      Ok(text)
    } else {
      Err(StepError::Format(text).into())
    }
  }

  fn call_format(&mut self, source: &str, style: StyleHandle) -> Result<i32> {
    let range = self.format_default_range.call(self.instance.store_mut())?;
    self.instance.send_string(source)?;
    let formatted = self.format.call(self.instance.store_mut(), style, range)?;
    Ok(self.formatted_get.call(self.instance.store_mut(), formatted)?)
  }

  /// Unwraps a `Configured` handle into a style or the formatter's diagnostic.
  pub fn unwrap_configured(&mut self, configured: i32) -> Result<StyleHandle> {
    let result = self
      .configured_get
      .call(self.instance.store_mut(), configured)
      .context(StepError::ConfigParse(CONFIG_FAILED.to_string()))?;
    if result >= 0 {
      return Ok(result);
    }
    let diagnostic = self
      .instance
      .receive_string(result.unsigned_abs() as usize)
      .context(StepError::ConfigParse("Could not read the formatter's config diagnostic.".to_string()))?;
    Err(StepError::ConfigParse(diagnostic).into())
  }
}
