//! Error types.
//!
//! Two layers:
//!
//! - [`EngineError`] is the typed taxonomy of the ratio/pull engine. These
//!   are matchable by library callers and carry the offending key/label.
//! - [`AppError`] is the process-boundary error: a message plus an exit
//!   code, printed by `main` before terminating.
//!
//! Exit codes:
//! - 2: configuration errors (unreadable file, invalid YAML, bad schema)
//! - 3: unresolved data (missing dataset key, unknown reference constant)
//! - 4: arithmetic failures (division by zero, undefined pull)

use thiserror::Error;

/// Failure modes of the ratio/pull engine.
///
/// All variants are unrecoverable for the current invocation: a malformed
/// input makes the whole comparison table suspect, so the comparator aborts
/// on the first error rather than emitting a partial report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A ratio denominator has value exactly 0.
    #[error("division by zero: ratio denominator has value 0")]
    DivisionByZero,

    /// A zero-valued quantity with nonzero uncertainty entered a product or
    /// ratio; its relative uncertainty is undefined.
    #[error(
        "relative uncertainty undefined: operand has value 0 but uncertainty {uncertainty}"
    )]
    UndefinedRelativeUncertainty { uncertainty: f64 },

    /// Both pull inputs are exact (uncertainty 0) but their values differ.
    #[error(
        "pull undefined: measured {measured} and reference {reference} are both exact and differ"
    )]
    UndefinedPull { measured: f64, reference: f64 },

    /// A comparison referenced a dataset entry that was never resolved.
    #[error("unresolved key: no {entry} recorded for {key}")]
    UnresolvedKey { entry: String, key: String },

    /// A reference expression named a constant absent from the dataset.
    #[error("unknown reference constant '{name}'")]
    UnresolvedReference { name: String },

    /// A double ratio referenced a ratio row not declared earlier in its group.
    #[error("no ratio row labelled '{reference}' declared earlier in the group")]
    UndeclaredRow { reference: String },

    /// A row-level failure, annotated with the row's label for reporting.
    #[error("row '{label}': {source}")]
    Row {
        label: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Annotate an error with the label of the row being computed.
    pub fn in_row(self, label: impl Into<String>) -> Self {
        EngineError::Row {
            label: label.into(),
            source: Box::new(self),
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            EngineError::DivisionByZero
            | EngineError::UndefinedRelativeUncertainty { .. }
            | EngineError::UndefinedPull { .. } => 4,
            EngineError::UnresolvedKey { .. }
            | EngineError::UnresolvedReference { .. }
            | EngineError::UndeclaredRow { .. } => 3,
            EngineError::Row { source, .. } => source.exit_code(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
