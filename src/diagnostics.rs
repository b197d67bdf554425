use std::fmt::{Display, Formatter};
use std::slice::Iter;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

/// One report from a compilation stage, tied to a 1-based source line.
#[derive(Debug, PartialEq, Clone)]
pub struct Diagnostic {
    pub line: usize,
    pub stage: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // stage and severity concatenate with no separator, as in
        // "[Line 3] ScannerError: ...". That is the established report format.
        write!(
            f,
            "[Line {}] {}{}: {}",
            self.line, self.stage, self.severity, self.message
        )
    }
}

/// Ordered collector handed back from a scan instead of a process-wide
/// "had error" flag. A single pass may report any number of entries.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn error(&mut self, line: usize, stage: &'static str, message: String) {
        self.entries.push(Diagnostic {
            line,
            stage,
            severity: Severity::Error,
            message,
        });
    }

    #[allow(dead_code)]
    pub fn warning(&mut self, line: usize, stage: &'static str, message: String) {
        self.entries.push(Diagnostic {
            line,
            stage,
            severity: Severity::Warning,
            message,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> Iter<'_, Diagnostic> {
        self.entries.iter()
    }
}
