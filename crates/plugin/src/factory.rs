use anyhow::Result;
use stepfmt_core::environment::Environment;
use stepfmt_core::FormatterStep;

use crate::FormatterStepConfig;

/// A configured step that can produce its `FormatterStep`.
///
/// Creating the step validates the configuration but does not
/// resolve or load anything.
pub trait FormatterStepFactory {
  fn new_formatter_step<TEnvironment: Environment>(&self, config: &FormatterStepConfig<TEnvironment>) -> Result<FormatterStep>;
}
