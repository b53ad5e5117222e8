use anyhow::Context;
use anyhow::Result;
use stepfmt_core::StepError;
use wasmer::TypedFunction;

use super::binding::CONFIG_FAILED;
use super::ApiEra;
use super::ScalafmtApi;
use super::ScalafmtBinding;
use super::StyleHandle;
use crate::wasm::LinkedInstance;

/// 2.x and later, where config is parsed by `Scalafmt.parseHoconConfig`.
pub struct ModernScalafmt {
  binding: ScalafmtBinding,
  parse_hocon_config: TypedFunction<(), i32>,
}

impl ModernScalafmt {
  pub fn bind(instance: LinkedInstance) -> Result<Self> {
    let parse_hocon_config = instance.export(super::PARSE_HOCON_CONFIG)?;
    Ok(ModernScalafmt {
      binding: ScalafmtBinding::bind(instance)?,
      parse_hocon_config,
    })
  }

  fn call_parse(&mut self, hocon: &str) -> Result<i32> {
    self.binding.instance_mut().send_string(hocon)?;
    Ok(self.parse_hocon_config.call(self.binding.instance_mut().store_mut())?)
  }
}

impl ScalafmtApi for ModernScalafmt {
  fn era(&self) -> ApiEra {
    ApiEra::Modern
  }

  fn default_style(&mut self) -> Result<StyleHandle> {
    self.binding.default_style()
  }

  fn parse_config(&mut self, hocon: &str) -> Result<StyleHandle> {
    let configured = self.call_parse(hocon).context(StepError::ConfigParse(CONFIG_FAILED.to_string()))?;
    self.binding.unwrap_configured(configured)
  }

  fn format(&mut self, source: &str, style: StyleHandle) -> Result<String> {
    self.binding.format(source, style)
  }
}
