use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::get_sha256_checksum;
use crate::FileFilter;
use crate::FormatterFunc;

/// Hex encoded SHA-256 of a step's serialized identity.
pub type StepSignature = String;

trait CacheableRealization: Send + Sync {
  fn state_json(&self) -> Result<serde_json::Value>;
  fn func(&self) -> Result<&dyn FormatterFunc>;
}

/// Realizes its state and then its function at most once each.
struct LazyRealization<TState, TStateSupplier, TFuncFactory> {
  state_supplier: TStateSupplier,
  func_factory: TFuncFactory,
  state: OnceCell<TState>,
  func: OnceCell<Box<dyn FormatterFunc>>,
}

impl<TState, TStateSupplier, TFuncFactory> LazyRealization<TState, TStateSupplier, TFuncFactory>
where
  TStateSupplier: Fn() -> Result<TState>,
{
  fn state(&self) -> Result<&TState> {
    self.state.get_or_try_init(|| (self.state_supplier)())
  }
}

impl<TState, TStateSupplier, TFuncFactory> CacheableRealization for LazyRealization<TState, TStateSupplier, TFuncFactory>
where
  TState: Serialize + Send + Sync,
  TStateSupplier: Fn() -> Result<TState> + Send + Sync,
  TFuncFactory: Fn(&TState) -> Result<Box<dyn FormatterFunc>> + Send + Sync,
{
  fn state_json(&self) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(self.state()?)?)
  }

  fn func(&self) -> Result<&dyn FormatterFunc> {
    let func = self.func.get_or_try_init(|| {
      let state = self.state()?;
      (self.func_factory)(state)
    })?;
    Ok(func.as_ref())
  }
}

/// Realizes its function at most once. Has no serializable state.
struct NeverUpToDateRealization<TFuncSupplier> {
  func_supplier: TFuncSupplier,
  func: OnceCell<Box<dyn FormatterFunc>>,
}

trait UncacheableRealization: Send + Sync {
  fn func(&self) -> Result<&dyn FormatterFunc>;
}

impl<TFuncSupplier> UncacheableRealization for NeverUpToDateRealization<TFuncSupplier>
where
  TFuncSupplier: Fn() -> Result<Box<dyn FormatterFunc>> + Send + Sync,
{
  fn func(&self) -> Result<&dyn FormatterFunc> {
    let func = self.func.get_or_try_init(|| (self.func_supplier)())?;
    Ok(func.as_ref())
  }
}

#[derive(Clone)]
enum StepKind {
  /// The state fully describes the step's behavior.
  Cacheable(Arc<dyn CacheableRealization>),
  /// Behavior depends on ambient state (ex. git history) so the
  /// step must run on every invocation.
  NeverUpToDate(Arc<dyn UncacheableRealization>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedStep<'a> {
  name: &'a str,
  state: serde_json::Value,
  filters: Vec<String>,
}

/// A named formatting unit whose realization is separate from invocation.
///
/// Cloning a step shares its realization.
#[derive(Clone)]
pub struct FormatterStep {
  name: String,
  kind: StepKind,
  filters: Vec<Arc<dyn FileFilter>>,
}

impl FormatterStep {
  /// Creates a cacheable step.
  ///
  /// `state_supplier` captures the inputs that determine the step's
  /// behavior and `func_factory` turns them into the formatting function.
  /// Both run lazily, at most once on success.
  pub fn create_lazy<TState, TStateSupplier, TFuncFactory>(name: impl Into<String>, state_supplier: TStateSupplier, func_factory: TFuncFactory) -> Self
  where
    TState: Serialize + Send + Sync + 'static,
    TStateSupplier: Fn() -> Result<TState> + Send + Sync + 'static,
    TFuncFactory: Fn(&TState) -> Result<Box<dyn FormatterFunc>> + Send + Sync + 'static,
  {
    FormatterStep {
      name: name.into(),
      kind: StepKind::Cacheable(Arc::new(LazyRealization {
        state_supplier,
        func_factory,
        state: OnceCell::new(),
        func: OnceCell::new(),
      })),
      filters: Vec::new(),
    }
  }

  /// Creates a step that the host must never consider up to date.
  pub fn create_never_up_to_date_lazy<TFuncSupplier>(name: impl Into<String>, func_supplier: TFuncSupplier) -> Self
  where
    TFuncSupplier: Fn() -> Result<Box<dyn FormatterFunc>> + Send + Sync + 'static,
  {
    FormatterStep {
      name: name.into(),
      kind: StepKind::NeverUpToDate(Arc::new(NeverUpToDateRealization {
        func_supplier,
        func: OnceCell::new(),
      })),
      filters: Vec::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Only applies this step to files accepted by the filter.
  pub fn filter_by_file(mut self, filter: Arc<dyn FileFilter>) -> Self {
    self.filters.push(filter);
    self
  }

  pub fn applies_to(&self, file_path: &Path) -> bool {
    self.filters.iter().all(|filter| filter.accept(file_path))
  }

  pub fn is_never_up_to_date(&self) -> bool {
    matches!(self.kind, StepKind::NeverUpToDate(_))
  }

  /// The key the host may use to cache this step's output.
  ///
  /// Realizes the step's state. `None` for never-up-to-date steps.
  pub fn cache_key(&self) -> Result<Option<StepSignature>> {
    match &self.kind {
      StepKind::Cacheable(realization) => {
        let signed = SignedStep {
          name: &self.name,
          state: realization.state_json()?,
          filters: self.filters.iter().map(|filter| filter.id()).collect(),
        };
        let bytes = serde_json::to_vec(&signed)?;
        Ok(Some(get_sha256_checksum(&bytes)))
      }
      StepKind::NeverUpToDate(_) => Ok(None),
    }
  }

  /// Gets the realized function, realizing it if necessary.
  pub fn func(&self) -> Result<&dyn FormatterFunc> {
    match &self.kind {
      StepKind::Cacheable(realization) => realization.func(),
      StepKind::NeverUpToDate(realization) => realization.func(),
    }
  }

  /// Formats the provided text.
  ///
  /// Returns `None` when the file is excluded by this step's filters.
  pub fn format(&self, raw: &str, file_path: &Path) -> Result<Option<String>> {
    if !self.applies_to(file_path) {
      return Ok(None);
    }
    self.func()?.apply_with_file(raw, file_path).map(Some)
  }
}

impl PartialEq for FormatterStep {
  fn eq(&self, other: &Self) -> bool {
    match (&self.kind, &other.kind) {
      (StepKind::Cacheable(_), StepKind::Cacheable(_)) => {
        if self.name != other.name {
          return false;
        }
        match (self.cache_key(), other.cache_key()) {
          (Ok(a), Ok(b)) => a == b,
          _ => false,
        }
      }
      (StepKind::NeverUpToDate(a), StepKind::NeverUpToDate(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl std::fmt::Debug for FormatterStep {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FormatterStep")
      .field("name", &self.name)
      .field("never_up_to_date", &self.is_never_up_to_date())
      .field("filters", &self.filters.iter().map(|filter| filter.id()).collect::<Vec<_>>())
      .finish()
  }
}
