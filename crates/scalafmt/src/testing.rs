//! Small formatter modules that implement the scalafmt ABI for tests.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use stepfmt_core::environment::TestEnvironment;
use stepfmt_core::ArtifactState;
use stepfmt_core::Provisioner;

pub const CONFIG_DIAGNOSTIC: &str = "Invalid config: unexpected token at line 1";
pub const FORMAT_ERROR: &str = "Unable to parse source: illegal start of definition";

// Memory layout: 0 transfer buffer (1024 bytes), 1024 config diagnostic,
// 2048 format error, 4096 shared bytes.
//
// The default style (1) makes sure the text ends with a newline. Any parsed
// style (2) leaves it unchanged. Sources starting with `#` fail to format and
// config starting with `!` is rejected.
const FORMATTER_TEMPLATE: &str = r#"(module
  (;import;)
  (memory (export "memory") 1)
  (data (i32.const 1024) "(;diagnostic;)")
  (data (i32.const 2048) "(;format_error;)")
  (global $len (mut i32) (i32.const 0))

  (func $copy (param $dst i32) (param $src i32) (param $n i32)
    (block $done
      (loop $next
        (br_if $done (i32.eqz (local.get $n)))
        (i32.store8 (local.get $dst) (i32.load8_u (local.get $src)))
        (local.set $dst (i32.add (local.get $dst) (i32.const 1)))
        (local.set $src (i32.add (local.get $src) (i32.const 1)))
        (local.set $n (i32.sub (local.get $n) (i32.const 1)))
        (br $next))))

  (func $first_byte_is (param $byte i32) (result i32)
    (if (result i32) (i32.eqz (global.get $len))
      (then (i32.const 0))
      (else (i32.eq (i32.load8_u (i32.const 4096)) (local.get $byte)))))

  (func $set_shared (param $src i32) (param $n i32)
    (call $copy (i32.const 4096) (local.get $src) (local.get $n))
    (global.set $len (local.get $n)))

  (func (export "get_wasm_memory_buffer") (result i32) (i32.const 0))
  (func (export "get_wasm_memory_buffer_size") (result i32) (i32.const 1024))
  (func (export "clear_shared_bytes") (param $n i32) (global.set $len (i32.const 0)))
  (func (export "add_to_shared_bytes_from_buffer") (param $n i32)
    (call $copy (i32.add (i32.const 4096) (global.get $len)) (i32.const 0) (local.get $n))
    (global.set $len (i32.add (global.get $len) (local.get $n))))
  (func (export "set_buffer_with_shared_bytes") (param $offset i32) (param $n i32)
    (call $copy (i32.const 0) (i32.add (i32.const 4096) (local.get $offset)) (local.get $n)))

  (func (export "Scalafmt.format$default$2") (result i32) (i32.const 1))
  (func (export "Scalafmt.format$default$3") (result i32) (i32.const 7))
  (func (export "Scalafmt.format") (param $style i32) (param $range i32) (result i32)
    (if (i32.ne (local.get $range) (i32.const 7)) (then (unreachable)))
    (if (call $first_byte_is (i32.const 35))
      (then
        (call $set_shared (i32.const 2048) (i32.const (;format_error_len;)))
        (return (i32.const 6))))
    (if (i32.eq (local.get $style) (i32.const 1))
      (then
        (if (i32.or
              (i32.eqz (global.get $len))
              (i32.ne (i32.load8_u (i32.add (i32.const 4095) (global.get $len))) (i32.const 10)))
          (then
            (i32.store8 (i32.add (i32.const 4096) (global.get $len)) (;newline;))
            (global.set $len (i32.add (global.get $len) (i32.const 1)))))))
    (i32.const 3))
  (func (export "Formatted.get") (param $handle i32) (result i32)
    (if (i32.eq (local.get $handle) (i32.const 3)) (then (return (global.get $len))))
    (if (i32.eq (local.get $handle) (i32.const 6)) (then (return (i32.sub (i32.const 0) (global.get $len)))))
    (unreachable))

  (func $parse (result i32)
    (if (call $first_byte_is (i32.const 33))
      (then
        (call $set_shared (i32.const 1024) (i32.const (;diagnostic_len;)))
        (return (i32.const 5))))
    (i32.const 4))
  (func (export "Configured.get") (param $handle i32) (result i32)
    (if (i32.eq (local.get $handle) (i32.const 4)) (then (return (i32.const 2))))
    (if (i32.eq (local.get $handle) (i32.const 5)) (then (return (i32.sub (i32.const 0) (global.get $len)))))
    (unreachable))

  (;config_api;)
  (;trapping;)
)"#;

const MODERN_CONFIG_API: &str = r#"(func (export "Scalafmt.parseHoconConfig") (result i32) (call $parse))"#;

const LEGACY_CONFIG_API: &str = r#"(func (export "Config.fromHoconString$default$2") (result i32) (i32.const 9))
  (func (export "Config.fromHoconString") (param $path i32) (result i32)
    (if (i32.ne (local.get $path) (i32.const 9)) (then (unreachable)))
    (call $parse))"#;

/// Builds a formatter module.
#[derive(Debug, Clone)]
pub struct FormatterFixture {
  legacy: bool,
  omitted_exports: Vec<String>,
  trapping_exports: Vec<String>,
  newline_import: Option<String>,
}

impl FormatterFixture {
  pub fn modern() -> Self {
    FormatterFixture {
      legacy: false,
      omitted_exports: Vec::new(),
      trapping_exports: Vec::new(),
      newline_import: None,
    }
  }

  pub fn legacy() -> Self {
    FormatterFixture {
      legacy: true,
      ..FormatterFixture::modern()
    }
  }

  pub fn without_export(mut self, name: &str) -> Self {
    self.omitted_exports.push(name.to_string());
    self
  }

  /// Replaces an `(i32) -> i32` export, such as `Formatted.get`, with one that traps.
  pub fn trapping_in(mut self, name: &str) -> Self {
    self.trapping_exports.push(name.to_string());
    self
  }

  /// Gets the newline character from a `newline` function exported by another module.
  pub fn importing_newline_from(mut self, module_name: &str) -> Self {
    self.newline_import = Some(module_name.to_string());
    self
  }

  pub fn to_wat(&self) -> String {
    let (import, newline) = match &self.newline_import {
      Some(module_name) => (
        format!(r#"(import "{}" "newline" (func $newline (result i32)))"#, module_name),
        "(call $newline)".to_string(),
      ),
      None => (String::new(), "(i32.const 10)".to_string()),
    };
    let mut wat = FORMATTER_TEMPLATE
      .replace("(;import;)", &import)
      .replace("(;diagnostic;)", CONFIG_DIAGNOSTIC)
      .replace("(;diagnostic_len;)", &CONFIG_DIAGNOSTIC.len().to_string())
      .replace("(;format_error;)", FORMAT_ERROR)
      .replace("(;format_error_len;)", &FORMAT_ERROR.len().to_string())
      .replace("(;newline;)", &newline)
      .replace("(;config_api;)", if self.legacy { LEGACY_CONFIG_API } else { MODERN_CONFIG_API });
    for name in self.omitted_exports.iter().chain(&self.trapping_exports) {
      wat = wat.replace(&format!(r#"(export "{}")"#, name), "");
    }
    let trapping = self
      .trapping_exports
      .iter()
      .map(|name| format!(r#"(func (export "{}") (param i32) (result i32) (unreachable))"#, name))
      .collect::<Vec<_>>()
      .join("\n  ");
    wat.replace("(;trapping;)", &trapping)
  }

  pub fn to_wasm(&self) -> Vec<u8> {
    wat_to_wasm(&self.to_wat())
  }
}

/// A module exporting `newline`, optionally named in its name section.
pub fn newline_module_wasm(module_name: Option<&str>) -> Vec<u8> {
  let name = module_name.map(|name| format!("${}", name)).unwrap_or_default();
  wat_to_wasm(&format!(r#"(module {} (func (export "newline") (result i32) (i32.const 10)))"#, name))
}

fn wat_to_wasm(wat: &str) -> Vec<u8> {
  wasmer::wat2wasm(wat.as_bytes()).unwrap().to_vec()
}

/// A provisioner that always returns the provided files, recording each request.
#[derive(Default, Clone)]
pub struct FixedProvisioner {
  files: Vec<PathBuf>,
  requests: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl FixedProvisioner {
  pub fn new(files: Vec<PathBuf>) -> Self {
    FixedProvisioner {
      files,
      requests: Default::default(),
    }
  }

  pub fn requests(&self) -> Vec<String> {
    self.requests.lock().clone()
  }
}

impl Provisioner for FixedProvisioner {
  fn resolve(&self, coordinate: &str) -> Result<Vec<PathBuf>> {
    self.requests.lock().push(coordinate.to_string());
    Ok(self.files.clone())
  }
}

/// Writes the modules to the environment in order and returns their paths.
pub fn write_modules(environment: &TestEnvironment, dir: impl AsRef<Path>, modules: &[(&str, Vec<u8>)]) -> Vec<PathBuf> {
  modules
    .iter()
    .map(|(file_name, bytes)| {
      let path = dir.as_ref().join(file_name);
      environment.write_file_bytes(&path, bytes);
      path
    })
    .collect()
}

pub fn write_artifacts(environment: &TestEnvironment, dir: impl AsRef<Path>, modules: &[(&str, Vec<u8>)]) -> ArtifactState {
  let provisioner = FixedProvisioner::new(write_modules(environment, dir, modules));
  ArtifactState::from("org.scalameta:scalafmt-core_2.13:3.0.8", &provisioner, environment).unwrap()
}
