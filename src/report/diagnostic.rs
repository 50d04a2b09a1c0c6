// Diagnostics accumulated during one compilation run

use std::fmt;

/// Which phase found the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Type,
    Scope,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lexical => write!(f, "Lexical"),
            DiagnosticKind::Syntax => write!(f, "Syntax"),
            DiagnosticKind::Type => write!(f, "Type"),
            DiagnosticKind::Scope => write!(f, "Scope"),
        }
    }
}

/// A non-fatal problem found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            line,
            message: message.into(),
        }
    }
}

/// Listing format: `"<Kind> Error: <message>"`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Error: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let d = Diagnostic::new(DiagnosticKind::Scope, 3, "undeclared variable 'y'");
        assert_eq!(d.to_string(), "Scope Error: undeclared variable 'y'");
    }
}
