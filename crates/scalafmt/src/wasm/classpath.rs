use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use stepfmt_core::environment::Environment;
use stepfmt_core::log_debug;
use stepfmt_core::ArtifactState;
use stepfmt_core::StepError;
use wasmer::sys::Cranelift;
use wasmer::Engine;
use wasmer::sys::EngineBuilder;
use wasmer::Imports;
use wasmer::Instance;
use wasmer::Module;
use wasmer::Store;

use super::LinkedInstance;

/// The export that marks the module holding the formatter entry point.
pub const FORMATTER_EXPORT: &str = "Scalafmt.format";

struct ClasspathModule {
  /// Namespace other modules import this module's exports from.
  name: String,
  module: Module,
}

/// The formatter's modules compiled into an engine the host shares with nothing else.
///
/// Modules are kept in instantiation order so that every module comes
/// after the modules it imports from.
pub struct IsolatedClasspath {
  engine: Engine,
  modules: Vec<ClasspathModule>,
  formatter_index: usize,
}

impl IsolatedClasspath {
  /// Compiles the resolved artifacts.
  pub fn load(artifacts: &ArtifactState, environment: &impl Environment) -> Result<Self> {
    let engine = create_engine();
    let mut modules = Vec::with_capacity(artifacts.artifacts().len());
    for artifact in artifacts.artifacts() {
      let bytes = environment.read_file_bytes(artifact.path())?;
      let module = match Module::new(&engine, bytes) {
        Ok(module) => module,
        Err(err) => {
          return Err(StepError::Linkage(format!("Error compiling module {}: {:#}.", artifact.file_name(), err)).into());
        }
      };
      let name = match module.name() {
        Some(name) => name.to_string(),
        None => module_name_from_path(artifact.path()),
      };
      if modules.iter().any(|m: &ClasspathModule| m.name == name) {
        return Err(
          StepError::Linkage(format!(
            "More than one module resolved for {} is named '{}'.",
            artifacts.coordinate(),
            name
          ))
          .into(),
        );
      }
      modules.push(ClasspathModule { name, module });
    }

    // the formatter module is picked by resolution order, before sorting
    let formatter_name = match modules.iter().find(|m| exports(&m.module, FORMATTER_EXPORT)) {
      Some(m) => m.name.clone(),
      None => {
        return Err(
          StepError::Linkage(format!(
            "None of the modules resolved for {} export '{}'.",
            artifacts.coordinate(),
            FORMATTER_EXPORT
          ))
          .into(),
        )
      }
    };
    let modules = sort_by_dependencies(modules)?;
    let formatter_index = modules.iter().position(|m| m.name == formatter_name).unwrap_or_default();
    let classpath = IsolatedClasspath {
      engine,
      modules,
      formatter_index,
    };
    log_debug!(
      environment,
      "Loaded {} module(s) for {} ({})",
      classpath.modules.len(),
      artifacts.coordinate(),
      classpath.module_names().join(", ")
    );
    Ok(classpath)
  }

  /// Gets if the formatter module exports the provided name.
  pub fn formatter_exports(&self, name: &str) -> bool {
    exports(&self.modules[self.formatter_index].module, name)
  }

  pub fn module_names(&self) -> Vec<&str> {
    self.modules.iter().map(|m| m.name.as_str()).collect()
  }

  /// Instantiates every module into a fresh store.
  pub fn link(&self) -> Result<LinkedInstance> {
    let mut store = Store::new(self.engine.clone());
    let mut instances: Vec<(String, Instance)> = Vec::with_capacity(self.modules.len());
    for classpath_module in &self.modules {
      let mut imports = Imports::new();
      for (name, instance) in &instances {
        imports.register_namespace(name, instance.exports.iter().map(|(name, export)| (name.clone(), export.clone())));
      }
      let instance = match Instance::new(&mut store, &classpath_module.module, &imports) {
        Ok(instance) => instance,
        Err(err) => {
          return Err(StepError::Linkage(format!("Error instantiating module {}: {:#}.", classpath_module.name, err)).into());
        }
      };
      instances.push((classpath_module.name.clone(), instance));
    }

    let formatter = instances.swap_remove(self.formatter_index).1;
    let dependencies = instances.into_iter().map(|(_, instance)| instance).collect();
    LinkedInstance::new(store, formatter, dependencies, self.engine.clone())
  }
}

fn create_engine() -> Engine {
  let compiler = Cranelift::default();
  let engine = EngineBuilder::new(compiler).engine();
  engine.into()
}

fn exports(module: &Module, name: &str) -> bool {
  module.exports().any(|export| export.name() == name)
}

fn module_name_from_path(path: &Path) -> String {
  match path.file_stem() {
    Some(stem) => stem.to_string_lossy().to_string(),
    None => path.display().to_string(),
  }
}

/// Orders modules so each one follows the modules it imports from.
fn sort_by_dependencies(modules: Vec<ClasspathModule>) -> Result<Vec<ClasspathModule>> {
  let names = modules.iter().map(|m| m.name.clone()).collect::<HashSet<_>>();
  for m in &modules {
    for import in m.module.imports() {
      if !names.contains(import.module()) {
        return Err(
          StepError::Linkage(format!(
            "Module {} imports '{}' from '{}', which is not among the resolved modules.",
            m.name,
            import.name(),
            import.module()
          ))
          .into(),
        );
      }
    }
  }

  let mut pending = modules;
  let mut sorted: Vec<ClasspathModule> = Vec::with_capacity(pending.len());
  let mut linked: HashSet<String> = HashSet::new();
  while !pending.is_empty() {
    let ready_index = pending
      .iter()
      .position(|m| m.module.imports().all(|import| linked.contains(import.module())));
    match ready_index {
      Some(index) => {
        let m = pending.remove(index);
        linked.insert(m.name.clone());
        sorted.push(m);
      }
      None => {
        let names = pending.iter().map(|m| m.name.as_str()).collect::<Vec<_>>();
        return Err(StepError::Linkage(format!("Modules import from each other in a cycle: {}.", names.join(", "))).into());
      }
    }
  }
  Ok(sorted)
}
