//! User-friendly diagnostic formatting for the demonstration binary.
//!
//! `EmitError` (see `error.rs`) carries structured failure data; this module
//! renders it (and ad-hoc warnings) for a terminal, following the
//! "actionable error" shape: root cause, context, suggested fix.

use std::fmt;
use std::path::PathBuf;

/// Suggestion text for each fatal condition in spec §7.
pub mod suggestions {
    pub const MISSING_LINKER_LANGUAGE: &str =
        "help: set a linker language on the target, or give it at least one source \
         whose language implies one (e.g. a .cpp file implies CXX)";

    pub const MISSING_RULE_VARIABLE: &str =
        "help: add the missing `CMAKE_<LANG>_...` rule template to the toolchain \
         variable table for this (language, configuration) pair";

    pub const CYCLIC_DEPENDENCY: &str =
        "help: break the cycle by removing one of the listed dependency edges; \
         FASTBuild has no forward-declaration mechanism for targets";

    pub const SINK_WRITE_FAILED: &str =
        "help: check that the home output directory is writable and has free space";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  note: {}\n", ctx));
        }

        for suggestion in &self.suggestions {
            output.push_str(&format!("  {}\n", suggestion));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_formatting() {
        let diag = Diagnostic::error("cyclic dependency between targets")
            .with_context("A -> B -> A")
            .with_suggestion(suggestions::CYCLIC_DEPENDENCY);

        let output = diag.format(false);
        assert!(output.contains("error: cyclic dependency"));
        assert!(output.contains("A -> B -> A"));
        assert!(output.contains("break the cycle"));
    }
}
