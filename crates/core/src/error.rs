use thiserror::Error;

/// The kinds of failures a step can report.
///
/// These are usually carried inside an `anyhow::Error`, either as the
/// error itself or as context over the underlying cause. Use
/// [`StepError::find`] to recover the kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
  /// The step was configured incorrectly by the user.
  #[error("{0}")]
  Config(String),
  /// The provisioner could not produce the artifact set.
  #[error("Could not resolve artifacts for '{0}'.")]
  Resolution(String),
  /// The formatter artifacts lack an expected module or symbol.
  #[error("{0} This formatter version is probably not supported.")]
  Linkage(String),
  /// The formatter rejected its configuration. Holds the formatter's diagnostic.
  #[error("{0}")]
  ConfigParse(String),
  #[error("{0}")]
  Format(String),
  #[error("{0}")]
  UnsupportedOperation(String),
}

impl StepError {
  /// Finds the step error kind inside an error or its cause chain.
  pub fn find(err: &anyhow::Error) -> Option<&StepError> {
    err
      .downcast_ref::<StepError>()
      .or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<StepError>()))
  }
}
