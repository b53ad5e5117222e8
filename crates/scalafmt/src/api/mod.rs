use anyhow::Result;

mod binding;
mod legacy;
mod modern;

use binding::ScalafmtBinding;
pub use legacy::LegacyScalafmt;
pub use modern::ModernScalafmt;

use crate::wasm::IsolatedClasspath;

/// The export whose presence selects the modern config API.
pub const PARSE_HOCON_CONFIG: &str = "Scalafmt.parseHoconConfig";

/// A handle to a style (`ScalafmtConfig`) owned by a linked instance.
pub type StyleHandle = i32;

/// Which generation of the scalafmt API a release exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEra {
  Legacy,
  Modern,
}

/// The formatter API of one linked instance.
pub trait ScalafmtApi: Send {
  fn era(&self) -> ApiEra;
  fn default_style(&mut self) -> Result<StyleHandle>;
  /// Parses HOCON config text. Rejections carry the formatter's diagnostic.
  fn parse_config(&mut self, hocon: &str) -> Result<StyleHandle>;
  fn format(&mut self, source: &str, style: StyleHandle) -> Result<String>;
}

/// Links a new instance and binds the API its era exposes.
pub fn bind(classpath: &IsolatedClasspath) -> Result<Box<dyn ScalafmtApi>> {
  let instance = classpath.link()?;
  if classpath.formatter_exports(PARSE_HOCON_CONFIG) {
    Ok(Box::new(ModernScalafmt::bind(instance)?))
  } else {
    Ok(Box::new(LegacyScalafmt::bind(instance)?))
  }
}
