use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use serde::Deserialize;
use stepfmt_core::environment::Environment;
use stepfmt_core::StepError;

/// Character encoding used to read source and header files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Encoding {
  #[default]
  Utf8,
  Utf16Le,
  Utf16Be,
  Latin1,
  Ascii,
}

impl Encoding {
  /// Looks up an encoding by one of its common names, ignoring case.
  pub fn from_name(name: &str) -> Result<Self, StepError> {
    match name.trim().to_ascii_uppercase().replace('_', "-").as_str() {
      "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
      "UTF-16LE" | "UTF16LE" => Ok(Encoding::Utf16Le),
      "UTF-16BE" | "UTF16BE" => Ok(Encoding::Utf16Be),
      "ISO-8859-1" | "ISO8859-1" | "LATIN1" => Ok(Encoding::Latin1),
      "US-ASCII" | "ASCII" => Ok(Encoding::Ascii),
      _ => Err(StepError::Config(format!("Unsupported encoding '{}'.", name))),
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Encoding::Utf8 => "UTF-8",
      Encoding::Utf16Le => "UTF-16LE",
      Encoding::Utf16Be => "UTF-16BE",
      Encoding::Latin1 => "ISO-8859-1",
      Encoding::Ascii => "US-ASCII",
    }
  }

  pub fn decode(&self, bytes: &[u8]) -> Result<String> {
    match self {
      Encoding::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
      Encoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
      Encoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
      Encoding::Latin1 => Ok(bytes.iter().map(|b| *b as char).collect()),
      Encoding::Ascii => Ok(bytes.iter().map(|b| if b.is_ascii() { *b as char } else { char::REPLACEMENT_CHARACTER }).collect()),
    }
  }

  pub fn read_file(&self, file_path: &Path, environment: &impl Environment) -> Result<String> {
    let bytes = environment.read_file_bytes(file_path)?;
    self.decode(&bytes)
  }
}

fn decode_utf16(bytes: &[u8], to_u16: fn([u8; 2]) -> u16) -> Result<String> {
  if bytes.len() % 2 != 0 {
    bail!("Expected an even number of bytes for UTF-16 text, but got {}.", bytes.len());
  }
  let units = bytes.chunks_exact(2).map(|pair| to_u16([pair[0], pair[1]])).collect::<Vec<_>>();
  Ok(String::from_utf16(&units)?)
}

impl TryFrom<String> for Encoding {
  type Error = StepError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Encoding::from_name(&value)
  }
}
