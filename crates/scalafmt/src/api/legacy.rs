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

/// Releases that parse config with `Config.fromHoconString(hocon, path)`.
pub struct LegacyScalafmt {
  binding: ScalafmtBinding,
  from_hocon_string: TypedFunction<i32, i32>,
  from_hocon_string_default_path: TypedFunction<(), i32>,
}

impl LegacyScalafmt {
  pub fn bind(instance: LinkedInstance) -> Result<Self> {
    let from_hocon_string = instance.export("Config.fromHoconString")?;
    let from_hocon_string_default_path = instance.export("Config.fromHoconString$default$2")?;
    Ok(LegacyScalafmt {
      binding: ScalafmtBinding::bind(instance)?,
      from_hocon_string,
      from_hocon_string_default_path,
    })
  }

  fn call_parse(&mut self, hocon: &str) -> Result<i32> {
    // the path only matters for includes, which the default handles
    let path = self.from_hocon_string_default_path.call(self.binding.instance_mut().store_mut())?;
    self.binding.instance_mut().send_string(hocon)?;
    Ok(self.from_hocon_string.call(self.binding.instance_mut().store_mut(), path)?)
  }
}

impl ScalafmtApi for LegacyScalafmt {
  fn era(&self) -> ApiEra {
    ApiEra::Legacy
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
