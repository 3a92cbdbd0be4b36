//! Fatal and recoverable error types (spec §7).

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::suggestions;

/// Errors that can abort an emission. Everything else spec §7 calls
/// "recoverable" is handled in place by producing empty/defaulted output
/// and never reaches this type.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum EmitError {
    /// The offending target cannot be emitted; its target-level emission
    /// is abandoned but previously-emitted text is kept (spec §7).
    #[error("target '{target}' has no linker language and none could be derived from its sources")]
    #[diagnostic(help("{}", suggestions::MISSING_LINKER_LANGUAGE))]
    MissingLinkerLanguage { target: String },

    /// No `CMAKE_<LANG>_...` template exists for this (language, config).
    #[error("missing rule variable '{variable}' for target '{target}'")]
    #[diagnostic(help("{}", suggestions::MISSING_RULE_VARIABLE))]
    MissingRuleVariable { target: String, variable: String },

    /// C5's residual set was non-empty at termination.
    #[error("cyclic dependency detected among: {}", members.join(", "))]
    #[diagnostic(help("{}", suggestions::CYCLIC_DEPENDENCY))]
    CyclicDependency { members: Vec<String> },

    /// The output sink failed; propagated from the writer.
    #[error("failed to write output: {0}")]
    #[diagnostic(help("{}", suggestions::SINK_WRITE_FAILED))]
    SinkWrite(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EmitError>;
